//! Gateway tests against real listening services

use listings::config::GatewaySettings;
use listings::gateway::{router, Gateway};
use axum::routing::post;
use listings::server::{racing_app, routes, serve, sports_app, HealthChecker};
use listings::service::{ListEventsResponse, ListRacesResponse, RacingService, SportsService};
use listings::{Event, ListingRepo, Race, SqliteStore};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Bind an ephemeral port and serve `app` in the background.
async fn spawn(app: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = serve(listener, app).await;
    });
    addr
}

fn ready(service: &str) -> Arc<HealthChecker> {
    let health = Arc::new(HealthChecker::new(service));
    health.set_ready();
    health
}

async fn spawn_racing(seed_count: u32) -> SocketAddr {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let repo = ListingRepo::<Race>::new(store).with_seed_count(seed_count);
    repo.init().unwrap();
    spawn(racing_app(Arc::new(RacingService::new(Arc::new(repo))), ready("racing"))).await
}

async fn spawn_sports(seed_count: u32) -> SocketAddr {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let repo = ListingRepo::<Event>::new(store).with_seed_count(seed_count);
    repo.init().unwrap();
    spawn(sports_app(Arc::new(SportsService::new(Arc::new(repo))), ready("sports"))).await
}

async fn spawn_gateway(racing: &str, sports: &str) -> String {
    let settings = GatewaySettings {
        racing_endpoint: racing.to_string(),
        sports_endpoint: sports.to_string(),
        timeout_secs: 2,
        ..GatewaySettings::default()
    };
    let gateway = Arc::new(Gateway::new(&settings).unwrap());
    let addr = spawn(router(gateway, ready("gateway"))).await;
    format!("http://{}", addr)
}

/// An address nothing listens on.
async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

#[tokio::test]
async fn test_list_races_through_gateway() {
    let racing = spawn_racing(20).await;
    let sports = spawn_sports(0).await;
    let base = spawn_gateway(&racing.to_string(), &format!("http://{}", sports)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/v1/list-races", base))
        .json(&json!({"filter": {"visible": true}, "order": {"field": "number", "direction": "ASC"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: ListRacesResponse = response.json().await.unwrap();
    assert!(body.races.iter().all(|race| race.visible));
    let numbers: Vec<i64> = body.races.iter().map(|r| r.number).collect();
    let mut sorted = numbers.clone();
    sorted.sort();
    assert_eq!(numbers, sorted);
}

#[tokio::test]
async fn test_get_by_id_through_gateway() {
    let racing = spawn_racing(3).await;
    let sports = spawn_sports(3).await;
    let base = spawn_gateway(&racing.to_string(), &sports.to_string()).await;
    let client = reqwest::Client::new();

    let race: Race = client
        .get(format!("{}/v1/races/2", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(race.id, 2);

    let event: Event = client
        .get(format!("{}/v1/events/3", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(event.name, format!("{} vs {}", event.away_team, event.home_team));

    // upstream 404 is relayed
    let response = client.get(format!("{}/v1/events/99", base)).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(content_type(&response), "application/json");

    let response = client.get(format!("{}/v1/races/0", base)).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

fn content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_upstream_content_type_is_relayed() {
    let draining = axum::Router::new().route(
        routes::LIST_RACES,
        post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "draining") }),
    );
    let upstream = spawn(draining).await;
    let base = spawn_gateway(&upstream.to_string(), &upstream.to_string()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/list-races", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    assert!(content_type(&response).starts_with("text/plain"));
    assert_eq!(response.text().await.unwrap(), "draining");
}

#[tokio::test]
async fn test_list_events_through_gateway() {
    let racing = spawn_racing(0).await;
    let sports = spawn_sports(15).await;
    let base = spawn_gateway(&racing.to_string(), &sports.to_string()).await;

    let body: ListEventsResponse = reqwest::Client::new()
        .post(format!("{}/v1/list-events", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.events.len(), 15);
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let down = closed_port().await;
    let base = spawn_gateway(&down.to_string(), &down.to_string()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/list-races", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], 502);
}

#[tokio::test]
async fn test_unknown_route() {
    let down = closed_port().await;
    let base = spawn_gateway(&down.to_string(), &down.to_string()).await;

    let response = reqwest::get(format!("{}/v2/anything", base)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
