//! Prometheus metrics and structured event logging for cost analysis

use prometheus::{
    register_gauge, register_histogram_vec, register_int_counter_vec, register_int_gauge, Gauge,
    HistogramVec, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Latency buckets in seconds; operations are in-memory so most land low
const LATENCY_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

static GLOBAL_METRICS: OnceLock<AnalyzerMetricsInner> = OnceLock::new();

struct AnalyzerMetricsInner {
    requests_total: IntCounterVec,
    errors_total: IntCounterVec,
    request_latency_seconds: HistogramVec,
    catalog_entries: IntGauge,
    last_estimate_total_usd: Gauge,
}

impl AnalyzerMetricsInner {
    fn new() -> Self {
        Self {
            requests_total: register_int_counter_vec!(
                "cost_agent_requests_total",
                "Analyzer operations executed",
                &["operation"]
            )
            .expect("Failed to register requests_total"),

            errors_total: register_int_counter_vec!(
                "cost_agent_errors_total",
                "Analyzer operations that returned an error",
                &["operation", "kind"]
            )
            .expect("Failed to register errors_total"),

            request_latency_seconds: register_histogram_vec!(
                "cost_agent_request_latency_seconds",
                "Time spent executing an analyzer operation",
                &["operation"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_latency_seconds"),

            catalog_entries: register_int_gauge!(
                "cost_agent_catalog_entries",
                "Number of services in the loaded pricing catalog"
            )
            .expect("Failed to register catalog_entries"),

            last_estimate_total_usd: register_gauge!(
                "cost_agent_last_estimate_total_usd",
                "Monthly total of the most recent architecture estimate"
            )
            .expect("Failed to register last_estimate_total_usd"),
        }
    }
}

/// Handle to the process-wide analyzer metrics
///
/// Clones share the same registered collectors.
#[derive(Clone)]
pub struct AnalyzerMetrics {
    _private: (),
}

impl Default for AnalyzerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AnalyzerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AnalyzerMetricsInner {
        GLOBAL_METRICS.get_or_init(AnalyzerMetricsInner::new)
    }

    /// Count one execution of `operation` and record its latency
    pub fn observe_request(&self, operation: &str, duration_secs: f64) {
        let inner = self.inner();
        inner.requests_total.with_label_values(&[operation]).inc();
        inner
            .request_latency_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn inc_errors(&self, operation: &str, kind: &str) {
        self.inner()
            .errors_total
            .with_label_values(&[operation, kind])
            .inc();
    }

    pub fn set_catalog_entries(&self, count: usize) {
        self.inner()
            .catalog_entries
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn set_last_estimate_total(&self, total_usd: f64) {
        self.inner().last_estimate_total_usd.set(total_usd);
    }

    pub fn requests(&self, operation: &str) -> u64 {
        self.inner()
            .requests_total
            .with_label_values(&[operation])
            .get()
    }

    pub fn errors(&self, operation: &str, kind: &str) -> u64 {
        self.inner()
            .errors_total
            .with_label_values(&[operation, kind])
            .get()
    }
}

/// Structured logger for cost agent events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn log_startup(&self, version: &str, port: u16, catalog_entries: usize) {
        info!(
            event = "agent_started",
            instance = %self.instance,
            agent_version = %version,
            port = port,
            catalog_entries = catalog_entries,
            "Cost analysis agent started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "agent_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Cost analysis agent shutting down"
        );
    }

    pub fn log_catalog_loaded(&self, source: &str, entries: usize) {
        info!(
            event = "catalog_loaded",
            instance = %self.instance,
            source = %source,
            entries = entries,
            "Pricing catalog loaded"
        );
    }

    /// The configured catalog could not be read; built-in prices are served
    pub fn log_catalog_fallback(&self, path: &str, error: &str) {
        warn!(
            event = "catalog_fallback",
            instance = %self.instance,
            path = %path,
            error = %error,
            "Pricing catalog unavailable, falling back to built-in prices"
        );
    }

    pub fn log_action(&self, operation: &str, elapsed_ms: f64) {
        info!(
            event = "action_completed",
            instance = %self.instance,
            operation = %operation,
            elapsed_ms = elapsed_ms,
            "Cost action completed"
        );
    }

    pub fn log_action_failed(&self, operation: &str, kind: &str, message: &str) {
        warn!(
            event = "action_failed",
            instance = %self.instance,
            operation = %operation,
            kind = %kind,
            message = %message,
            "Cost action failed"
        );
    }
}
