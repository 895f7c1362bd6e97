//! Cost analysis agent: serves the analyzer's action group over HTTP

pub mod api;
pub mod config;

use cost_analyzer::{
    health::{components, HealthRegistry},
    load_catalog, ActionHandler, AnalyzerMetrics, CostAnalyzer, PricingCatalog,
    StructuredLogger,
};
use std::sync::Arc;

pub use api::{create_router, serve, AppState};
pub use config::AgentConfig;

/// Load the pricing catalog and assemble the shared state
///
/// A configured catalog that cannot be loaded is replaced by the built-in
/// price list and the `catalog` component reports degraded.
pub async fn build_state(config: &AgentConfig, logger: &StructuredLogger) -> Arc<AppState> {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::CATALOG).await;
    health_registry.register(components::ACTION_API).await;

    let catalog = match &config.catalog_path {
        None => {
            let catalog = PricingCatalog::aws_default();
            logger.log_catalog_loaded("built-in", catalog.len());
            catalog
        }
        Some(path) => match load_catalog(path) {
            Ok(catalog) => {
                logger.log_catalog_loaded(&path.display().to_string(), catalog.len());
                catalog
            }
            Err(e) => {
                let error = format!("{:#}", e);
                logger.log_catalog_fallback(&path.display().to_string(), &error);
                health_registry
                    .set_degraded(components::CATALOG, format!("using built-in prices: {}", error))
                    .await;
                PricingCatalog::aws_default()
            }
        },
    };

    let analyzer =
        CostAnalyzer::new(Arc::new(catalog)).with_region(config.default_region.clone());
    let handler = ActionHandler::new(analyzer).with_logger(logger.clone());

    Arc::new(AppState::new(handler, health_registry, AnalyzerMetrics::new()))
}
