//! RPC handlers
//!
//! One handler per service method. Each records a request metric and turns
//! service errors into the JSON error body.

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::entity::{Event, Race};
use crate::error::{Error, Result};
use crate::metrics;
use crate::service::{
    GetEventRequest, GetRaceRequest, ListEventsRequest, ListEventsResponse, ListRacesRequest,
    ListRacesResponse, Racing, Sports,
};

/// Record metrics and log the outcome of one RPC.
fn observe<T>(service: &str, method: &str, start: Instant, result: &Result<T>) {
    let elapsed = start.elapsed();
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    metrics::record_request(service, method, status.as_u16(), elapsed.as_secs_f64());

    match result {
        Err(e @ Error::NotFound(_)) | Err(e @ Error::InvalidArgument(_)) => {
            info!(service, method, error = %e, "Request rejected");
        }
        Err(e) => {
            error!(service, method, error = %e, "Request failed");
        }
        Ok(_) => {}
    }
}

/// `racing.Racing/ListRaces`
#[instrument(skip(service, request))]
pub async fn list_races(
    Extension(service): Extension<Arc<dyn Racing>>,
    Json(request): Json<ListRacesRequest>,
) -> Result<Json<ListRacesResponse>> {
    let start = Instant::now();
    let result = service.list_races(request).await;
    observe("racing", "ListRaces", start, &result);
    result.map(Json)
}

/// `racing.Racing/GetRace`
#[instrument(skip(service))]
pub async fn get_race(
    Extension(service): Extension<Arc<dyn Racing>>,
    Json(request): Json<GetRaceRequest>,
) -> Result<Json<Race>> {
    let start = Instant::now();
    let result = service.get_race(request).await;
    observe("racing", "GetRace", start, &result);
    result.map(Json)
}

/// `sports.Sports/ListEvents`
#[instrument(skip(service, request))]
pub async fn list_events(
    Extension(service): Extension<Arc<dyn Sports>>,
    Json(request): Json<ListEventsRequest>,
) -> Result<Json<ListEventsResponse>> {
    let start = Instant::now();
    let result = service.list_events(request).await;
    observe("sports", "ListEvents", start, &result);
    result.map(Json)
}

/// `sports.Sports/GetEvent`
#[instrument(skip(service))]
pub async fn get_event(
    Extension(service): Extension<Arc<dyn Sports>>,
    Json(request): Json<GetEventRequest>,
) -> Result<Json<Event>> {
    let start = Instant::now();
    let result = service.get_event(request).await;
    observe("sports", "GetEvent", start, &result);
    result.map(Json)
}
