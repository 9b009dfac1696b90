//! Pokemon relay - forwards creature lookups to the upstream provider
//!
//! Answers `GET /pokemon/{name}` with the creature's name, sprite and
//! weight for the browser-hosted catch-rate form.

use anyhow::{Context, Result};
use catch_lib::{
    health::UpstreamHealth,
    lookup::{PokeApiClient, UpstreamConfig},
    observability::{RelayMetrics, StructuredLogger},
};
use pokemon_relay::{api, config::RelayConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const RELAY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting pokemon-relay");

    let config = RelayConfig::load()?;
    info!(
        port = config.port,
        upstream = %config.upstream_url,
        cors_origin = %config.cors_origin,
        "Relay configured"
    );

    let client = PokeApiClient::new(UpstreamConfig {
        base_url: config.upstream_url.clone(),
        timeout: config.upstream_timeout(),
    })
    .context("Failed to create upstream client")?;

    let logger = StructuredLogger::new("pokemon-relay");
    logger.log_startup(RELAY_VERSION, &config.upstream_url, config.port);

    let app_state = Arc::new(api::AppState::new(
        Arc::new(client),
        UpstreamHealth::new(config.unhealthy_after),
        RelayMetrics::new(),
        logger.clone(),
    ));

    tokio::select! {
        result = api::serve(config.port, &config.cors_origin, app_state) => {
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
