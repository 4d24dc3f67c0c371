//! Prometheus metrics
//!
//! Features:
//! - Request counts and latency per service method
//! - Order clause outcomes per table (applied, skipped, not requested)

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Once;
use tracing::{error, info};

use crate::query::OrderOutcome;

lazy_static::lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    pub static ref REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("listings_requests_total", "Total number of RPC requests"),
        &["service", "method", "status"]
    ).unwrap();

    pub static ref REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "listings_request_duration_seconds",
            "RPC request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["service", "method"]
    ).unwrap();

    pub static ref ORDER_OUTCOMES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("listings_order_outcomes_total", "Order clause outcomes by table"),
        &["table", "outcome"]
    ).unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry.
pub fn init_metrics() {
    REGISTER.call_once(|| {
        METRICS_REGISTRY.register(Box::new(REQUESTS_TOTAL.clone())).ok();
        METRICS_REGISTRY.register(Box::new(REQUEST_DURATION.clone())).ok();
        METRICS_REGISTRY.register(Box::new(ORDER_OUTCOMES_TOTAL.clone())).ok();
        info!("Metrics initialized");
    });
}

/// Record one served request.
pub fn record_request(service: &str, method: &str, status: u16, duration_secs: f64) {
    REQUESTS_TOTAL
        .with_label_values(&[service, method, &status.to_string()])
        .inc();
    REQUEST_DURATION
        .with_label_values(&[service, method])
        .observe(duration_secs);
}

/// Record how a listing request's order spec was resolved.
pub fn record_order_outcome(table: &str, outcome: &OrderOutcome) {
    ORDER_OUTCOMES_TOTAL
        .with_label_values(&[table, outcome.label()])
        .inc();
}

/// Export all metrics in Prometheus text format
pub fn export_metrics() -> String {
    init_metrics();

    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("# Error converting metrics\n"))
}
