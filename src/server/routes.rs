//! RPC routes definition
//!
//! Methods are addressed as `/<package>.<Service>/<Method>` and take a JSON
//! request body:
//! - POST /racing.Racing/ListRaces
//! - POST /racing.Racing/GetRace
//! - POST /sports.Sports/ListEvents
//! - POST /sports.Sports/GetEvent

use axum::{extract::Extension, routing::post, Router};
use std::sync::Arc;

use super::handlers;
use crate::service::{Racing, Sports};

pub const LIST_RACES: &str = "/racing.Racing/ListRaces";
pub const GET_RACE: &str = "/racing.Racing/GetRace";
pub const LIST_EVENTS: &str = "/sports.Sports/ListEvents";
pub const GET_EVENT: &str = "/sports.Sports/GetEvent";

/// Racing RPC routes
pub fn racing_routes(service: Arc<dyn Racing>) -> Router {
    Router::new()
        .route(LIST_RACES, post(handlers::list_races))
        .route(GET_RACE, post(handlers::get_race))
        .layer(Extension(service))
}

/// Sports RPC routes
pub fn sports_routes(service: Arc<dyn Sports>) -> Router {
    Router::new()
        .route(LIST_EVENTS, post(handlers::list_events))
        .route(GET_EVENT, post(handlers::get_event))
        .layer(Extension(service))
}
