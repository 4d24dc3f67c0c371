//! Listing services
//!
//! The async service surface over the blocking repositories. Each service is
//! a trait so the RPC layer can be exercised against any implementation.

pub mod racing;
pub mod sports;

pub use racing::{GetRaceRequest, ListRacesRequest, ListRacesResponse, Racing, RacingService};
pub use sports::{GetEventRequest, ListEventsRequest, ListEventsResponse, Sports, SportsService};

use crate::error::{Error, Result};

/// Run blocking repository work off the async reactor.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal(format!("blocking task failed: {}", e)))?
}
