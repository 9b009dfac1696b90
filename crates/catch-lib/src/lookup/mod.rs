//! Subject lookups
//!
//! This module provides:
//! - The `SubjectSource` seam shared by the upstream client and the
//!   form's relay client
//! - Name normalization before any network call
//! - The HTTP client for the upstream provider

mod upstream;


pub use upstream::{ClientBuildError, PokeApiClient, UpstreamConfig};

use crate::models::SubjectProfile;
use async_trait::async_trait;
use thiserror::Error;

/// Why a lookup produced no profile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The provider does not know the name
    #[error("Pokemon not found")]
    NotFound,

    /// Network failure, timeout, unexpected status or malformed payload
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound)
    }
}

/// Anything that can turn a normalized name into a profile
#[async_trait]
pub trait SubjectSource: Send + Sync {
    /// Fetch a profile for an already trimmed, lower-cased name
    async fn fetch(&self, query: &str) -> Result<SubjectProfile, LookupError>;
}

/// Trim and lower-case a subject name; `None` when nothing is left
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Resolve a subject by name
///
/// Returns `Ok(None)` without touching the source when the name is blank.
pub async fn resolve_subject<S>(source: &S, name: &str) -> Result<Option<SubjectProfile>, LookupError>
where
    S: SubjectSource + ?Sized,
{
    let Some(query) = normalize_name(name) else {
        return Ok(None);
    };

    source.fetch(&query).await.map(Some)
}
