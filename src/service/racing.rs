//! Racing service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use super::blocking;
use crate::entity::{Race, RaceFilter};
use crate::error::Result;
use crate::query::OrderSpec;
use crate::storage::ListingRepo;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRacesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<RaceFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRacesResponse {
    #[serde(default)]
    pub races: Vec<Race>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRaceRequest {
    pub id: i64,
}

/// Race listing operations.
#[async_trait]
pub trait Racing: Send + Sync + 'static {
    async fn list_races(&self, request: ListRacesRequest) -> Result<ListRacesResponse>;

    async fn get_race(&self, request: GetRaceRequest) -> Result<Race>;
}

/// [`Racing`] backed by a race repository.
#[derive(Debug, Clone)]
pub struct RacingService {
    repo: Arc<ListingRepo<Race>>,
}

impl RacingService {
    pub fn new(repo: Arc<ListingRepo<Race>>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Racing for RacingService {
    #[instrument(skip(self, request))]
    async fn list_races(&self, request: ListRacesRequest) -> Result<ListRacesResponse> {
        let repo = self.repo.clone();
        let races = blocking(move || repo.list(request.filter.as_ref(), request.order.as_ref())).await?;
        Ok(ListRacesResponse { races })
    }

    #[instrument(skip(self))]
    async fn get_race(&self, request: GetRaceRequest) -> Result<Race> {
        let repo = self.repo.clone();
        blocking(move || repo.get_by_id(request.id)).await
    }
}
