//! HTTP API of the lookup relay

use catch_lib::{
    health::{UpstreamHealth, UpstreamStatus},
    lookup::{normalize_name, LookupError, SubjectSource},
    models::{ErrorResponse, RelayPayload},
    observability::{outcome_label, RelayMetrics, StructuredLogger},
};
use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SubjectSource>,
    pub health: UpstreamHealth,
    pub metrics: RelayMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        source: Arc<dyn SubjectSource>,
        health: UpstreamHealth,
        metrics: RelayMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            source,
            health: health.with_metrics(metrics.clone()),
            metrics,
            logger,
        }
    }
}

/// Look up a creature upstream and reshape the answer
async fn get_pokemon(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    let Some(query) = normalize_name(&name) else {
        return (StatusCode::NOT_FOUND, Json(ErrorResponse::not_found())).into_response();
    };

    let started = Instant::now();
    let result = state.source.fetch(&query).await;
    let elapsed = started.elapsed();

    state
        .metrics
        .observe_lookup(outcome_label(&result), elapsed.as_secs_f64());
    state
        .logger
        .log_lookup(&query, &result, elapsed.as_millis() as u64);

    match &result {
        Err(LookupError::Upstream(reason)) => {
            state.health.record_failure(reason.clone()).await;
        }
        _ => state.health.record_reachable().await,
    }

    match result {
        Ok(profile) => (StatusCode::OK, Json(RelayPayload::from(profile))).into_response(),
        Err(LookupError::NotFound) => {
            (StatusCode::NOT_FOUND, Json(ErrorResponse::not_found())).into_response()
        }
        Err(LookupError::Upstream(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal()),
        )
            .into_response(),
    }
}

/// Upstream health - 200 while operational, 503 once unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health.health().await;

    let status_code = match health.status {
        UpstreamStatus::Healthy | UpstreamStatus::Degraded => StatusCode::OK,
        UpstreamStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %err, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/pokemon/:name", get(get_pokemon))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, cors_origin: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let origin = HeaderValue::from_str(cors_origin)
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", cors_origin, e))?;
    let app = create_router(state, origin);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting relay server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
