//! HTTP API: action endpoints, pricing catalog, health checks and metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cost_analyzer::{
    action::to_document,
    health::{ComponentStatus, HealthRegistry},
    observability::AnalyzerMetrics,
    ActionHandler, AgentEvent, CostError, ErrorDocument, PricingEntry,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub handler: ActionHandler,
    pub health_registry: HealthRegistry,
    pub metrics: AnalyzerMetrics,
}

impl AppState {
    pub fn new(handler: ActionHandler, health_registry: HealthRegistry, metrics: AnalyzerMetrics) -> Self {
        Self {
            handler,
            health_registry,
            metrics,
        }
    }
}

fn status_for(err: &CostError) -> StatusCode {
    match err {
        CostError::UnknownService { .. } => StatusCode::NOT_FOUND,
        CostError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
    }
}

fn rejection_document(rejection: &JsonRejection) -> Json<ErrorDocument> {
    Json(ErrorDocument::from(&CostError::invalid_input(rejection.body_text())))
}

/// Run one action request; the body selects the operation
async fn invoke(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, rejection_document(&rejection)).into_response()
        }
    };

    let result = state.handler.handle_value(request);
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => status_for(err),
    };
    (status, Json(to_document(&result))).into_response()
}

/// Agent-runtime function call; failures travel inside the envelope
async fn agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentEvent>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(event)) => Json(state.handler.handle_agent_event(&event)).into_response(),
        Err(rejection) => {
            (StatusCode::BAD_REQUEST, rejection_document(&rejection)).into_response()
        }
    }
}

async fn catalog(State(state): State<Arc<AppState>>) -> Json<Vec<PricingEntry>> {
    let entries = state
        .handler
        .analyzer()
        .catalog()
        .entries()
        .into_iter()
        .cloned()
        .collect();
    Json(entries)
}

/// 200 while operational (healthy or degraded), 503 when unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let catalog_entries = state.handler.analyzer().catalog().entries().len();
    state.metrics.set_catalog_entries(catalog_entries);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("failed to encode metrics: {}", e).into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/invoke", post(invoke))
        .route("/api/v1/agent", post(agent))
        .route("/api/v1/catalog", get(catalog))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
