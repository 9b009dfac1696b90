//! Upstream health tracking for the relay
//!
//! Lookups report their outcome here; `/healthz` reports the result.
//! A not-found answer still proves the provider is reachable.

use crate::observability::RelayMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Consecutive failures before the upstream is reported unhealthy
pub const DEFAULT_UNHEALTHY_AFTER: u32 = 5;

/// Health of the upstream provider as seen by the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamStatus {
    /// Last lookup reached the provider
    Healthy,
    /// Recent lookups failed, but fewer than the threshold
    Degraded,
    Unhealthy,
}

impl UpstreamStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, UpstreamStatus::Healthy | UpstreamStatus::Degraded)
    }
}

/// Body of `/healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: UpstreamStatus,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_timestamp: Option<i64>,
    pub checked_at: i64,
}

#[derive(Debug, Default)]
struct Tracker {
    consecutive_failures: u32,
    last_error: Option<String>,
    last_success_timestamp: Option<i64>,
}

/// Shared upstream health record
///
/// When metrics are attached, the failure-streak gauge is updated under
/// the same write lock as the streak itself.
#[derive(Clone)]
pub struct UpstreamHealth {
    tracker: Arc<RwLock<Tracker>>,
    unhealthy_after: u32,
    metrics: Option<RelayMetrics>,
}

impl Default for UpstreamHealth {
    fn default() -> Self {
        Self::new(DEFAULT_UNHEALTHY_AFTER)
    }
}

impl UpstreamHealth {
    pub fn new(unhealthy_after: u32) -> Self {
        Self {
            tracker: Arc::new(RwLock::new(Tracker::default())),
            unhealthy_after: unhealthy_after.max(1),
            metrics: None,
        }
    }

    /// Mirror the failure streak into the relay's gauge
    pub fn with_metrics(mut self, metrics: RelayMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn publish(&self, failures: u32) {
        if let Some(metrics) = &self.metrics {
            metrics.set_consecutive_failures(failures);
        }
    }

    /// The provider answered (found or not found)
    pub async fn record_reachable(&self) {
        let mut tracker = self.tracker.write().await;
        tracker.consecutive_failures = 0;
        tracker.last_error = None;
        tracker.last_success_timestamp = Some(chrono::Utc::now().timestamp());
        self.publish(0);
    }

    /// The lookup failed for an upstream reason; returns the failure streak
    pub async fn record_failure(&self, reason: impl Into<String>) -> u32 {
        let mut tracker = self.tracker.write().await;
        tracker.consecutive_failures = tracker.consecutive_failures.saturating_add(1);
        tracker.last_error = Some(reason.into());
        self.publish(tracker.consecutive_failures);
        tracker.consecutive_failures
    }

    pub async fn status(&self) -> UpstreamStatus {
        let failures = self.tracker.read().await.consecutive_failures;
        self.classify(failures)
    }

    pub async fn health(&self) -> HealthResponse {
        let tracker = self.tracker.read().await;
        HealthResponse {
            status: self.classify(tracker.consecutive_failures),
            consecutive_failures: tracker.consecutive_failures,
            last_error: tracker.last_error.clone(),
            last_success_timestamp: tracker.last_success_timestamp,
            checked_at: chrono::Utc::now().timestamp(),
        }
    }

    fn classify(&self, failures: u32) -> UpstreamStatus {
        match failures {
            0 => UpstreamStatus::Healthy,
            n if n < self.unhealthy_after => UpstreamStatus::Degraded,
            _ => UpstreamStatus::Unhealthy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initially_healthy() {
        let health = UpstreamHealth::default();
        let response = health.health().await;

        assert_eq!(response.status, UpstreamStatus::Healthy);
        assert_eq!(response.consecutive_failures, 0);
        assert!(response.last_error.is_none());
    }

    #[tokio::test]
    async fn test_failures_degrade_then_fail() {
        let health = UpstreamHealth::new(3);

        health.record_failure("timed out").await;
        assert_eq!(health.status().await, UpstreamStatus::Degraded);

        health.record_failure("timed out").await;
        health.record_failure("connection refused").await;
        let response = health.health().await;
        assert_eq!(response.status, UpstreamStatus::Unhealthy);
        assert!(!response.status.is_operational());
        assert_eq!(response.last_error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_reachable_resets_failures() {
        let health = UpstreamHealth::new(2);
        health.record_failure("boom").await;
        health.record_failure("boom").await;
        assert_eq!(health.status().await, UpstreamStatus::Unhealthy);

        health.record_reachable().await;
        let response = health.health().await;
        assert_eq!(response.status, UpstreamStatus::Healthy);
        assert!(response.last_success_timestamp.is_some());
        assert!(response.last_error.is_none());
    }

    #[tokio::test]
    async fn test_gauge_follows_streak_under_concurrency() {
        let metrics = RelayMetrics::new();
        let health = UpstreamHealth::new(3).with_metrics(metrics.clone());

        let mut tasks = Vec::new();
        for i in 0..32 {
            let health = health.clone();
            tasks.push(tokio::spawn(async move {
                if i % 4 == 0 {
                    health.record_reachable().await;
                } else {
                    health.record_failure("timed out").await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let response = health.health().await;
        assert_eq!(
            metrics.consecutive_failures(),
            i64::from(response.consecutive_failures)
        );

        health.record_reachable().await;
        assert_eq!(metrics.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_zero_threshold_treated_as_one() {
        let health = UpstreamHealth::new(0);
        assert_eq!(health.record_failure("boom").await, 1);
        assert_eq!(health.status().await, UpstreamStatus::Unhealthy);
    }
}
