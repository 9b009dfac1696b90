//! Client for the lookup relay

use anyhow::{Context, Result};
use async_trait::async_trait;
use catch_lib::{
    lookup::{LookupError, SubjectSource},
    models::{ErrorResponse, RelayPayload, SubjectProfile},
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Relay client used by the form
pub struct RelayClient {
    client: Client,
    base_url: Url,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid relay URL")?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid relay URL: {}", base_url);
        }

        Ok(Self { client, base_url })
    }

    fn pokemon_url(&self, query: &str) -> Result<Url, LookupError> {
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
impl SubjectSource for RelayClient {
    async fn fetch(&self, query: &str) -> Result<SubjectProfile, LookupError> {
        let url = self.pokemon_url(query)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Upstream(format!("Failed to reach relay: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound);
        }
        if !status.is_success() {
            let detail = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            return Err(LookupError::Upstream(format!(
                "Relay error ({}): {}",
                status, detail
            )));
        }

        let payload: RelayPayload = response
            .json()
            .await
            .map_err(|e| LookupError::Upstream(format!("Failed to parse relay response: {}", e)))?;

        Ok(payload.into())
    }
}
