//! Sports service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use super::blocking;
use crate::entity::{Event, EventFilter};
use crate::error::Result;
use crate::query::OrderSpec;
use crate::storage::ListingRepo;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListEventsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<EventFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListEventsResponse {
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEventRequest {
    pub id: i64,
}

/// Sporting event listing operations.
#[async_trait]
pub trait Sports: Send + Sync + 'static {
    async fn list_events(&self, request: ListEventsRequest) -> Result<ListEventsResponse>;

    async fn get_event(&self, request: GetEventRequest) -> Result<Event>;
}

#[derive(Debug, Clone)]
pub struct SportsService {
    repo: Arc<ListingRepo<Event>>,
}

impl SportsService {
    pub fn new(repo: Arc<ListingRepo<Event>>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Sports for SportsService {
    #[instrument(skip(self, request))]
    async fn list_events(&self, request: ListEventsRequest) -> Result<ListEventsResponse> {
        let repo = self.repo.clone();
        let events = blocking(move || repo.list(request.filter.as_ref(), request.order.as_ref())).await?;
        Ok(ListEventsResponse { events })
    }

    #[instrument(skip(self))]
    async fn get_event(&self, request: GetEventRequest) -> Result<Event> {
        let repo = self.repo.clone();
        blocking(move || repo.get_by_id(request.id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Status;
    use crate::storage::SqliteStore;

    fn service() -> SportsService {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let repo = ListingRepo::<Event>::new(store).with_seed_count(30);
        repo.init().unwrap();
        SportsService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_list_events_by_venue() {
        let service = service();
        let all = service.list_events(ListEventsRequest::default()).await.unwrap();
        assert_eq!(all.events.len(), 30);

        let venue = all.events[0].venue_location.clone();
        let request = ListEventsRequest {
            filter: Some(EventFilter {
                venue_location: Some(venue.clone()),
                ..Default::default()
            }),
            order: None,
        };

        let response = service.list_events(request).await.unwrap();
        assert!(!response.events.is_empty());
        assert!(response.events.iter().all(|e| e.venue_location == venue));
    }

    #[tokio::test]
    async fn test_get_event_is_annotated() {
        let service = service();

        let event = service.get_event(GetEventRequest { id: 1 }).await.unwrap();
        assert_eq!(event.name, format!("{} vs {}", event.away_team, event.home_team));
        assert_ne!(event.status, Status::Unset);
    }

    #[tokio::test]
    async fn test_unknown_order_field_is_ignored() {
        let service = service();
        let request = ListEventsRequest {
            filter: None,
            order: Some(OrderSpec::by("1; DROP TABLE events").with_direction("DESC")),
        };

        let response = service.list_events(request).await.unwrap();
        assert_eq!(response.events.len(), 30);
    }
}
