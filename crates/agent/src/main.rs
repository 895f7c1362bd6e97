//! Cost Agent - architecture cost analysis action group
//!
//! Serves estimate, discount, optimization and comparison actions for the
//! architecture review agents.

use anyhow::Result;
use cost_agent::{build_state, serve, AgentConfig};
use cost_analyzer::{health::components, StructuredLogger};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting cost-agent");

    let config = AgentConfig::load()?;
    info!(
        instance = %config.instance_name,
        region = %config.default_region,
        "Agent configured"
    );

    let logger = StructuredLogger::new(&config.instance_name);
    let state = build_state(&config, &logger).await;
    let health_registry = state.health_registry.clone();
    let catalog_entries = state.handler.analyzer().catalog().entries().len();
    state.metrics.set_catalog_entries(catalog_entries);

    let mut api_handle = tokio::spawn(serve(config.api_port, state));

    health_registry.set_ready(true).await;
    logger.log_startup(AGENT_VERSION, config.api_port, catalog_entries);

    tokio::select! {
        result = &mut api_handle => {
            let reason = match result {
                Ok(Ok(())) => "API server exited".to_string(),
                Ok(Err(e)) => format!("API server failed: {:#}", e),
                Err(e) => format!("API server task panicked: {}", e),
            };
            error!(reason = %reason, "API server stopped");
            health_registry.set_unhealthy(components::ACTION_API, reason.clone()).await;
            logger.log_shutdown(&reason);
            anyhow::bail!(reason);
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
            info!("Shutting down");
        }
    }

    Ok(())
}
