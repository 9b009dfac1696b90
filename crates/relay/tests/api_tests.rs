//! Integration tests for the relay API endpoints

use stubs::FailingSource;
use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    Router,
};
use catch_lib::{
    health::UpstreamHealth,
    lookup::{PokeApiClient, SubjectSource, UpstreamConfig},
    observability::{RelayMetrics, StructuredLogger},
};
use pokemon_relay::api::{create_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const FORM_ORIGIN: &str = "http://localhost:3000";

const PIKACHU_JSON: &str = r#"{
    "id": 25,
    "name": "pikachu",
    "weight": 60,
    "sprites": { "front_default": "https://example.test/25.png" }
}"#;

mod stubs {
    use catch_lib::{
        lookup::{LookupError, SubjectSource},
        models::SubjectProfile,
    };

    /// Source that always fails like an unreachable provider
    pub struct FailingSource;

    #[async_trait::async_trait]
    impl SubjectSource for FailingSource {
        async fn fetch(&self, _query: &str) -> Result<SubjectProfile, LookupError> {
            Err(LookupError::Upstream("connection refused".to_string()))
        }
    }
}

fn setup_app(source: Arc<dyn SubjectSource>, unhealthy_after: u32) -> Router {
    let state = Arc::new(AppState::new(
        source,
        UpstreamHealth::new(unhealthy_after),
        RelayMetrics::new(),
        StructuredLogger::new("relay-test"),
    ));
    create_router(state, HeaderValue::from_static(FORM_ORIGIN))
}

fn upstream_client(server: &mockito::Server) -> Arc<dyn SubjectSource> {
    Arc::new(
        PokeApiClient::new(UpstreamConfig {
            base_url: server.url(),
            timeout: Duration::from_secs(2),
        })
        .unwrap(),
    )
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_lookup_returns_reshaped_payload() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PIKACHU_JSON)
        .create_async()
        .await;
    let app = setup_app(upstream_client(&server), 5);

    let (status, body) = get(&app, "/pokemon/pikachu").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({
            "name": "pikachu",
            "image": "https://example.test/25.png",
            "weight": 60
        })
    );
}

#[tokio::test]
async fn test_lookup_is_case_insensitive() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PIKACHU_JSON)
        .expect(2)
        .create_async()
        .await;
    let app = setup_app(upstream_client(&server), 5);

    let upper = get(&app, "/pokemon/PIKACHU").await;
    let lower = get(&app, "/pokemon/pikachu").await;

    assert_eq!(upper, lower);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_name_returns_404() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/pokemon/missingno")
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;
    let app = setup_app(upstream_client(&server), 5);

    let (status, body) = get(&app, "/pokemon/missingno").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({ "error": "Pokemon not found" }));
}

#[tokio::test]
async fn test_blank_name_returns_404_without_upstream_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let app = setup_app(upstream_client(&server), 5);

    let (status, body) = get(&app, "/pokemon/%20%20").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pokemon not found");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_outage_returns_500() {
    let app = setup_app(Arc::new(FailingSource), 5);

    let (status, body) = get(&app, "/pokemon/pikachu").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Internal Server Error" }));
}

#[tokio::test]
async fn test_malformed_upstream_payload_returns_500() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"name":"pikachu","weight":60,"sprites":{}}"#)
        .create_async()
        .await;
    let app = setup_app(upstream_client(&server), 5);

    let (status, body) = get(&app, "/pokemon/pikachu").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_failure_does_not_affect_next_request() {
    let mut server = mockito::Server::new_async().await;
    let _failing = server
        .mock("GET", "/pokemon/eevee")
        .with_status(502)
        .create_async()
        .await;
    let _healthy = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PIKACHU_JSON)
        .create_async()
        .await;
    let app = setup_app(upstream_client(&server), 5);

    let (first, _) = get(&app, "/pokemon/eevee").await;
    let (second, body) = get(&app, "/pokemon/pikachu").await;

    assert_eq!(first, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["weight"], 60);
}

#[tokio::test]
async fn test_cors_allows_form_origin() {
    let app = setup_app(Arc::new(FailingSource), 5);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/pokemon/pikachu")
                .header("origin", FORM_ORIGIN)
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        FORM_ORIGIN
    );
}

#[tokio::test]
async fn test_cors_header_on_lookup_response() {
    let app = setup_app(Arc::new(FailingSource), 5);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/pokemon/pikachu")
                .header("origin", FORM_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        FORM_ORIGIN
    );
}

#[tokio::test]
async fn test_healthz_tracks_upstream_failures() {
    let app = setup_app(Arc::new(FailingSource), 2);

    let (status, health) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");

    get(&app, "/pokemon/pikachu").await;
    let (status, health) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");

    get(&app, "/pokemon/pikachu").await;
    let (status, health) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(health["consecutive_failures"], 2);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_lookups() {
    let app = setup_app(Arc::new(FailingSource), 5);
    get(&app, "/pokemon/pikachu").await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("relay_lookups_total"));
    assert!(text.contains("outcome=\"failed\""));
}
