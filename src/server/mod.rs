//! Listing service servers
//!
//! Each listing service runs as its own axum server exposing its RPC
//! methods next to health and metrics endpoints:
//!
//! ```text
//! racing  :9000   POST /racing.Racing/{ListRaces,GetRace}
//! sports  :10000  POST /sports.Sports/{ListEvents,GetEvent}
//! both            GET  /health/live, /health/ready, /_metrics
//! ```

pub mod handlers;
pub mod health;
pub mod middleware;
pub mod routes;

use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::ServiceSettings;
use crate::entity::{Event, Race};
use crate::service::{Racing, RacingService, Sports, SportsService};
use crate::storage::{ListingRepo, SqliteStore};

pub use health::HealthChecker;

/// Wrap `routes` with health endpoints and the shared HTTP layers.
pub fn app(routes: Router, health: Arc<HealthChecker>) -> Router {
    routes
        .merge(health::health_routes(health))
        .layer(from_fn(middleware::log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Racing service router
pub fn racing_app(service: Arc<dyn Racing>, health: Arc<HealthChecker>) -> Router {
    app(routes::racing_routes(service), health)
}

/// Sports service router
pub fn sports_app(service: Arc<dyn Sports>, health: Arc<HealthChecker>) -> Router {
    app(routes::sports_routes(service), health)
}

/// Serve `app` on an already bound listener.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app).await.map_err(|e| {
        error!(error = %e, "Server error");
        anyhow::anyhow!("Server failed: {}", e)
    })
}

/// Open the store described by `settings`.
fn open_store(settings: &ServiceSettings) -> anyhow::Result<Arc<SqliteStore>> {
    let store = SqliteStore::open(&settings.db_path, settings.pool_size)?;
    Ok(Arc::new(store))
}

/// Start the racing service
pub async fn start_racing(settings: ServiceSettings) -> anyhow::Result<()> {
    info!(addr = %settings.addr(), db = %settings.db_path.display(), "Starting racing service");

    crate::metrics::init_metrics();
    let health = Arc::new(HealthChecker::new("racing"));

    let repo = ListingRepo::<Race>::new(open_store(&settings)?)
        .with_policy(settings.order_policy)
        .with_seed_count(settings.seed_count);
    repo.init()?;
    health.set_ready();

    let service: Arc<dyn Racing> = Arc::new(RacingService::new(Arc::new(repo)));
    let listener = TcpListener::bind(settings.addr()).await?;
    info!("Racing service listening on http://{}", settings.addr());

    serve(listener, racing_app(service, health)).await
}

/// Start the sports service
pub async fn start_sports(settings: ServiceSettings) -> anyhow::Result<()> {
    info!(addr = %settings.addr(), db = %settings.db_path.display(), "Starting sports service");

    crate::metrics::init_metrics();
    let health = Arc::new(HealthChecker::new("sports"));

    let repo = ListingRepo::<Event>::new(open_store(&settings)?)
        .with_policy(settings.order_policy)
        .with_seed_count(settings.seed_count);
    repo.init()?;
    health.set_ready();

    let service: Arc<dyn Sports> = Arc::new(SportsService::new(Arc::new(repo)));
    let listener = TcpListener::bind(settings.addr()).await?;
    info!("Sports service listening on http://{}", settings.addr());

    serve(listener, sports_app(service, health)).await
}
