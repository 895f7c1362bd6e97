//! Configuration management for the CLI

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the config file location
pub const CONFIG_ENV: &str = "COSTCTL_CONFIG";

/// Persistent CLI defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Agent URL; when unset commands run locally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Keys accepted by `costctl config set`
pub const KEYS: &[&str] = &["api_url", "region", "catalog", "format"];

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Set one key; an empty value clears it
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = Some(value.to_string()).filter(|v| !v.is_empty());
        match key {
            "api_url" => self.api_url = value,
            "region" => self.region = value,
            "catalog" => self.catalog = value.map(PathBuf::from),
            "format" => self.format = value,
            _ => bail!("Unknown config key '{}' (expected one of: {})", key, KEYS.join(", ")),
        }
        Ok(())
    }

    /// `$COSTCTL_CONFIG`, else `~/.config/costctl/config.json`
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("costctl").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set("api_url", "http://cost-agent:8080").unwrap();
        config.set("region", "ap-southeast-2").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url.as_deref(), Some("http://cost-agent:8080"));
        assert_eq!(loaded.region.as_deref(), Some("ap-southeast-2"));
        assert!(loaded.catalog.is_none());
    }

    #[test]
    fn test_set_clears_and_rejects_unknown_keys() {
        let mut config = Config::default();
        config.set("format", "json").unwrap();
        config.set("format", "").unwrap();
        assert!(config.format.is_none());

        let err = config.set("namespace", "prod").unwrap_err();
        assert!(err.to_string().contains("namespace"));
    }
}
