//! Catch-rate library for Heavy Slam
//!
//! This crate provides the core functionality for:
//! - Ball and status rate tables
//! - Estimator input validation and catch-rate scoring
//! - Form session state with sequenced subject lookups
//! - Subject lookups against the upstream provider
//! - Health tracking and observability for the relay

pub mod estimator;
pub mod health;
pub mod lookup;
pub mod models;
pub mod observability;
pub mod rates;
pub mod session;

pub use estimator::{compute_score, Estimate, EstimatorError, EstimatorInputs, Multipliers};
pub use health::{HealthResponse, UpstreamHealth, UpstreamStatus};
pub use lookup::{resolve_subject, LookupError, PokeApiClient, SubjectSource, UpstreamConfig};
pub use models::*;
pub use observability::{RelayMetrics, StructuredLogger};
pub use rates::{ContainerType, StatusCondition};
pub use session::{FormSession, LookupTicket, SessionSummary, SubjectState};
