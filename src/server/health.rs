//! Health check endpoints
//!
//! - Liveness: the process is serving HTTP
//! - Readiness: the listing repository has been initialized

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Health status body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ready" or "starting"
    pub status: String,
    pub service: String,
    pub ready: bool,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness tracker for one process.
#[derive(Debug)]
pub struct HealthChecker {
    service: String,
    start_time: Instant,
    ready: AtomicBool,
}

impl HealthChecker {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            start_time: Instant::now(),
            ready: AtomicBool::new(false),
        }
    }

    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        info!(service = %self.service, "Service is READY");
    }

    pub fn set_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
        warn!(service = %self.service, "Service is NOT READY");
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> HealthStatus {
        let ready = self.is_ready();
        HealthStatus {
            status: if ready { "ready" } else { "starting" }.to_string(),
            service: self.service.clone(),
            ready,
            version: crate::VERSION.to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

/// Liveness check: always 200 while the process answers.
async fn liveness_handler(Extension(health): Extension<Arc<HealthChecker>>) -> impl IntoResponse {
    (StatusCode::OK, Json(health.status()))
}

/// Readiness check: 503 until initialization completes.
async fn readiness_handler(Extension(health): Extension<Arc<HealthChecker>>) -> impl IntoResponse {
    let status = health.status();
    let code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// Prometheus metrics endpoint
async fn metrics_endpoint() -> String {
    crate::metrics::export_metrics()
}

/// Health and metrics routes
pub fn health_routes(health: Arc<HealthChecker>) -> Router {
    Router::new()
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/_metrics", get(metrics_endpoint))
        .layer(Extension(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn test_ready_transitions() {
        let health = HealthChecker::new("racing");
        assert!(!health.is_ready());
        assert_eq!(health.status().status, "starting");

        health.set_ready();
        assert_eq!(health.status().status, "ready");

        health.set_not_ready();
        assert!(!health.status().ready);
    }

    #[tokio::test]
    async fn test_readiness_endpoint() {
        let health = Arc::new(HealthChecker::new("sports"));
        let app = health_routes(health.clone());

        let request = || Request::builder().uri("/health/ready").body(Body::empty()).unwrap();

        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        health.set_ready();
        let response = app.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let app = health_routes(Arc::new(HealthChecker::new("gateway")));
        let response = app
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
