//! Cost analysis library for the architecture review agents
//!
//! This crate provides the core functionality for:
//! - A static, swappable AWS pricing catalog
//! - Per-service and aggregate monthly cost estimation
//! - Enterprise discount and on-premises comparison
//! - Rule-based cost optimization recommendations
//! - The action-group request/response boundary
//! - Health checks and observability

pub mod action;
pub mod analyzer;
pub mod catalog;
pub mod configuration;
pub mod error;
pub mod health;
pub mod models;
pub mod money;
pub mod observability;
pub mod optimizer;

pub use action::{
    ActionHandler, ActionRequest, ActionResponse, AgentEvent, AgentResponse, ErrorDocument, Operation,
};
pub use analyzer::{CostAnalyzer, DEFAULT_REGION};
pub use catalog::{load_catalog, PricingCatalog, PricingEntry, PricingSource, ServiceCategory};
pub use error::{CostError, CostResult};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{AnalyzerMetrics, StructuredLogger};
