//! HTTP gateway
//!
//! Maps the public REST surface onto the listing services' RPC methods:
//!
//! ```text
//! POST /v1/list-races   → racing.Racing/ListRaces
//! GET  /v1/races/:id    → racing.Racing/GetRace
//! POST /v1/list-events  → sports.Sports/ListEvents
//! GET  /v1/events/:id   → sports.Sports/GetEvent
//! ```
//!
//! Upstream status codes, bodies and content types are relayed unchanged. Transport
//! failures (connection refused, timeout) become `502 Bad Gateway`.

use axum::{
    extract::{Extension, Json, Path},
    http::{header, HeaderValue},
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument, warn};

use crate::config::GatewaySettings;
use crate::error::{Error, Result};
use crate::metrics;
use crate::server::{self, health, middleware, routes, HealthChecker};
use crate::service::{GetEventRequest, GetRaceRequest, ListEventsRequest, ListRacesRequest};

/// Upstream endpoints and the shared HTTP client.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    racing_endpoint: String,
    sports_endpoint: String,
}

impl Gateway {
    pub fn new(settings: &GatewaySettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            racing_endpoint: normalize_endpoint(&settings.racing_endpoint),
            sports_endpoint: normalize_endpoint(&settings.sports_endpoint),
        })
    }

    /// POST `payload` to `method` on `endpoint` and relay the upstream reply.
    async fn call<P: Serialize>(&self, endpoint: &str, method: &str, payload: &P) -> Result<Response> {
        let url = format!("{}{}", endpoint, method);
        let start = Instant::now();

        let response = self.client.post(&url).json(payload).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Upstream request failed");
            Error::Upstream(format!("{}: {}", url, e))
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));
        let body = response.bytes().await.map_err(|e| {
            warn!(url = %url, error = %e, "Failed to read upstream response");
            Error::Upstream(format!("{}: {}", url, e))
        })?;

        metrics::record_request("gateway", method, status.as_u16(), start.elapsed().as_secs_f64());
        info!(url = %url, status = status.as_u16(), bytes = body.len(), "Relayed upstream response");

        Ok((status, [(header::CONTENT_TYPE, content_type)], body).into_response())
    }
}

/// Add a scheme to bare `host:port` endpoints and drop any trailing slash.
fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    }
}

#[instrument(skip(gateway, request))]
async fn list_races(
    Extension(gateway): Extension<Arc<Gateway>>,
    Json(request): Json<ListRacesRequest>,
) -> Result<Response> {
    gateway.call(&gateway.racing_endpoint, routes::LIST_RACES, &request).await
}

#[instrument(skip(gateway))]
async fn get_race(Extension(gateway): Extension<Arc<Gateway>>, Path(id): Path<i64>) -> Result<Response> {
    gateway
        .call(&gateway.racing_endpoint, routes::GET_RACE, &GetRaceRequest { id })
        .await
}

#[instrument(skip(gateway, request))]
async fn list_events(
    Extension(gateway): Extension<Arc<Gateway>>,
    Json(request): Json<ListEventsRequest>,
) -> Result<Response> {
    gateway.call(&gateway.sports_endpoint, routes::LIST_EVENTS, &request).await
}

#[instrument(skip(gateway))]
async fn get_event(Extension(gateway): Extension<Arc<Gateway>>, Path(id): Path<i64>) -> Result<Response> {
    gateway
        .call(&gateway.sports_endpoint, routes::GET_EVENT, &GetEventRequest { id })
        .await
}

async fn not_found() -> Error {
    Error::NotFound("no such route".to_string())
}

/// Public gateway router
pub fn router(gateway: Arc<Gateway>, health: Arc<HealthChecker>) -> Router {
    Router::new()
        .route("/v1/list-races", post(list_races))
        .route("/v1/races/:id", get(get_race))
        .route("/v1/list-events", post(list_events))
        .route("/v1/events/:id", get(get_event))
        .fallback(not_found)
        .layer(Extension(gateway))
        .merge(health::health_routes(health))
        .layer(from_fn(middleware::log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway
pub async fn start_gateway(settings: GatewaySettings) -> anyhow::Result<()> {
    info!(
        addr = %settings.addr(),
        racing = %settings.racing_endpoint,
        sports = %settings.sports_endpoint,
        "Starting HTTP gateway"
    );

    metrics::init_metrics();
    let gateway = Arc::new(Gateway::new(&settings)?);
    let health = Arc::new(HealthChecker::new("gateway"));
    health.set_ready();

    let listener = TcpListener::bind(settings.addr()).await?;
    info!("Gateway listening on http://{}", settings.addr());

    server::serve(listener, router(gateway, health)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("localhost:9000"), "http://localhost:9000");
        assert_eq!(normalize_endpoint("http://racing:9000/"), "http://racing:9000");
        assert_eq!(normalize_endpoint("https://sports.internal"), "https://sports.internal");
    }
}
