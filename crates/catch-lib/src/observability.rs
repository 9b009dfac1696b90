//! Observability infrastructure for the relay
//!
//! Provides:
//! - Prometheus metrics (lookup outcomes, upstream latency, failure streak)
//! - Structured JSON logging with tracing

use crate::lookup::LookupError;
use crate::models::SubjectProfile;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for upstream round trips (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<RelayMetricsInner> = OnceLock::new();

struct RelayMetricsInner {
    lookups_total: IntCounterVec,
    upstream_latency_seconds: Histogram,
    upstream_consecutive_failures: IntGauge,
}

impl RelayMetricsInner {
    fn new() -> Self {
        Self {
            lookups_total: register_int_counter_vec!(
                "relay_lookups_total",
                "Subject lookups handled by the relay, by outcome",
                &["outcome"]
            )
            .expect("Failed to register lookups_total"),

            upstream_latency_seconds: register_histogram!(
                "relay_upstream_latency_seconds",
                "Round-trip time of upstream provider requests",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register upstream_latency_seconds"),

            upstream_consecutive_failures: register_int_gauge!(
                "relay_upstream_consecutive_failures",
                "Upstream failures since the provider last answered"
            )
            .expect("Failed to register upstream_consecutive_failures"),
        }
    }
}

/// Metric label for a lookup result
pub fn outcome_label(result: &Result<SubjectProfile, LookupError>) -> &'static str {
    match result {
        Ok(_) => "resolved",
        Err(LookupError::NotFound) => "not_found",
        Err(LookupError::Upstream(_)) => "failed",
    }
}

/// Relay metrics for Prometheus exposition
///
/// Clones share the same global metrics.
#[derive(Clone)]
pub struct RelayMetrics {
    _private: (),
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(RelayMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &RelayMetricsInner {
        GLOBAL_METRICS.get_or_init(RelayMetricsInner::new)
    }

    /// Record a finished lookup
    pub fn observe_lookup(&self, outcome: &str, upstream_secs: f64) {
        let inner = self.inner();
        inner.lookups_total.with_label_values(&[outcome]).inc();
        inner.upstream_latency_seconds.observe(upstream_secs);
    }

    pub fn set_consecutive_failures(&self, failures: u32) {
        self.inner()
            .upstream_consecutive_failures
            .set(i64::from(failures));
    }

    pub fn consecutive_failures(&self) -> i64 {
        self.inner().upstream_consecutive_failures.get()
    }

    pub fn lookups(&self, outcome: &str) -> u64 {
        self.inner().lookups_total.with_label_values(&[outcome]).get()
    }
}

/// Structured logger for relay events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, upstream: &str, port: u16) {
        info!(
            event = "relay_started",
            service = %self.service,
            version = %version,
            upstream = %upstream,
            port = port,
            "Lookup relay started"
        );
    }

    pub fn log_lookup(
        &self,
        query: &str,
        result: &Result<SubjectProfile, LookupError>,
        elapsed_ms: u64,
    ) {
        match result {
            Ok(profile) => info!(
                event = "lookup",
                service = %self.service,
                query = %query,
                outcome = "resolved",
                weight = profile.mass_units,
                elapsed_ms = elapsed_ms,
                "Subject resolved"
            ),
            Err(LookupError::NotFound) => info!(
                event = "lookup",
                service = %self.service,
                query = %query,
                outcome = "not_found",
                elapsed_ms = elapsed_ms,
                "Subject not found upstream"
            ),
            Err(LookupError::Upstream(reason)) => warn!(
                event = "lookup",
                service = %self.service,
                query = %query,
                outcome = "failed",
                reason = %reason,
                elapsed_ms = elapsed_ms,
                "Upstream lookup failed"
            ),
        }
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "relay_shutdown",
            service = %self.service,
            reason = %reason,
            "Lookup relay shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counts_outcomes() {
        let metrics = RelayMetrics::new();
        let before = metrics.lookups("not_found");

        metrics.observe_lookup("not_found", 0.02);

        assert_eq!(metrics.lookups("not_found"), before + 1);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(&Err(LookupError::NotFound)), "not_found");
        assert_eq!(
            outcome_label(&Err(LookupError::Upstream("x".to_string()))),
            "failed"
        );
        let ok = Ok(SubjectProfile {
            display_name: "pikachu".to_string(),
            mass_units: 60,
            sprite_ref: "s".to_string(),
        });
        assert_eq!(outcome_label(&ok), "resolved");
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("pokemon-relay");
        assert_eq!(logger.service, "pokemon-relay");
    }
}
