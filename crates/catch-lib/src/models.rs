//! Core data models shared by the relay and the form

use serde::{Deserialize, Serialize};

/// Everything the estimator needs to know about a looked-up subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub display_name: String,
    /// Weight as reported by the provider (hectograms for PokeAPI)
    pub mass_units: u32,
    pub sprite_ref: String,
}

/// Success body of `GET /pokemon/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    pub name: String,
    pub image: String,
    pub weight: u32,
}

impl From<SubjectProfile> for RelayPayload {
    fn from(profile: SubjectProfile) -> Self {
        Self {
            name: profile.display_name,
            image: profile.sprite_ref,
            weight: profile.mass_units,
        }
    }
}

impl From<RelayPayload> for SubjectProfile {
    fn from(payload: RelayPayload) -> Self {
        Self {
            display_name: payload.name,
            mass_units: payload.weight,
            sprite_ref: payload.image,
        }
    }
}

/// Error body returned by the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub const NOT_FOUND: &'static str = "Pokemon not found";
    pub const INTERNAL: &'static str = "Internal Server Error";

    pub fn not_found() -> Self {
        Self {
            error: Self::NOT_FOUND.to_string(),
        }
    }

    pub fn internal() -> Self {
        Self {
            error: Self::INTERNAL.to_string(),
        }
    }
}
