//! HTTP client for the upstream creature-data provider
//!
//! One GET per lookup: no retries, no caching. A per-request timeout
//! is applied and reported as an upstream failure.

use super::{LookupError, SubjectSource};
use crate::models::SubjectProfile;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Configuration for the upstream client
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Provider base URL; `/pokemon/{name}` is appended
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Failure to construct a `PokeApiClient`
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("upstream URL cannot carry a path: {0}")]
    NotABase(String),

    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Subset of the provider's creature document the relay needs
#[derive(Debug, Deserialize)]
struct PokemonDocument {
    name: String,
    weight: u32,
    #[serde(default)]
    sprites: Option<Sprites>,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    #[serde(default)]
    front_default: Option<String>,
}

impl PokemonDocument {
    fn into_profile(self) -> Result<SubjectProfile, LookupError> {
        let sprite = self
            .sprites
            .and_then(|s| s.front_default)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LookupError::Upstream("payload has no sprites.front_default".to_string()))?;

        Ok(SubjectProfile {
            display_name: self.name,
            mass_units: self.weight,
            sprite_ref: sprite,
        })
    }
}

/// Client for the upstream provider (PokeAPI by default)
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: Url,
}

impl PokeApiClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, ClientBuildError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientBuildError::NotABase(config.base_url));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/pokemon/{query}` with the query escaped as a single segment
    fn creature_url(&self, query: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Upstream(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .push("pokemon")
            .push(query);
        Ok(url)
    }
}

#[async_trait]
impl SubjectSource for PokeApiClient {
    async fn fetch(&self, query: &str) -> Result<SubjectProfile, LookupError> {
        let url = self.creature_url(query)?;
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(describe_transport_error)?;

        let status = response.status();
        debug!(
            query = %query,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream responded"
        );

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound);
        }
        if !status.is_success() {
            return Err(LookupError::Upstream(format!("upstream returned {}", status)));
        }

        let document: PokemonDocument = response
            .json()
            .await
            .map_err(|e| LookupError::Upstream(format!("malformed payload: {}", e)))?;

        document.into_profile()
    }
}

fn describe_transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Upstream("upstream timed out".to_string())
    } else {
        LookupError::Upstream(format!("request failed: {}", err))
    }
}
