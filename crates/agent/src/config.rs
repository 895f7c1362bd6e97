//! Agent configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Agent configuration, read from `COST_AGENT_*` variables and an optional
/// `cost-agent` file (toml, yaml or json) in the working directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentConfig {
    /// Instance name attached to every structured log line
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port for the action endpoints, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Region applied when a request names none
    #[serde(default = "default_region")]
    pub default_region: String,

    /// JSON pricing catalog replacing the built-in price list
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "cost-agent".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_region() -> String {
    cost_analyzer::DEFAULT_REGION.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            default_region: default_region(),
            catalog_path: None,
        }
    }
}

impl AgentConfig {
    /// Load configuration from the environment and optional config file
    pub fn load() -> Result<Self> {
        Self::load_from(config::Environment::with_prefix("COST_AGENT"))
    }

    fn load_from(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("cost-agent").required(false))
            .add_source(environment)
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
