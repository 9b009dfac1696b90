//! Relay configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Relay configuration, read from `RELAY_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upstream provider base URL
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Upstream request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    /// Origin of the browser-hosted form allowed by CORS
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Consecutive upstream failures before /healthz reports unhealthy
    #[serde(default = "default_unhealthy_after")]
    pub unhealthy_after: u32,
}

fn default_port() -> u16 {
    3001
}

fn default_upstream_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_upstream_timeout() -> u64 {
    5
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_unhealthy_after() -> u32 {
    catch_lib::health::DEFAULT_UNHEALTHY_AFTER
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            upstream_url: default_upstream_url(),
            upstream_timeout_secs: default_upstream_timeout(),
            cors_origin: default_cors_origin(),
            unhealthy_after: default_unhealthy_after(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("RELAY").try_parsing(true))
            .build()
            .context("Failed to read relay configuration")?;

        Self::from_config(config)
    }

    pub fn from_config(config: config::Config) -> Result<Self> {
        config
            .try_deserialize()
            .context("Invalid relay configuration")
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = config::Config::builder().build().unwrap();
        let relay = RelayConfig::from_config(config).unwrap();

        assert_eq!(relay.port, 3001);
        assert_eq!(relay.upstream_url, "https://pokeapi.co/api/v2");
        assert_eq!(relay.upstream_timeout(), Duration::from_secs(5));
        assert_eq!(relay.cors_origin, "http://localhost:3000");
        assert_eq!(relay.unhealthy_after, 5);
    }

    #[test]
    fn test_overrides() {
        let config = config::Config::builder()
            .set_override("port", 8088)
            .unwrap()
            .set_override("upstream_timeout_secs", 2)
            .unwrap()
            .set_override("cors_origin", "http://form.example.test")
            .unwrap()
            .build()
            .unwrap();
        let relay = RelayConfig::from_config(config).unwrap();

        assert_eq!(relay.port, 8088);
        assert_eq!(relay.upstream_timeout(), Duration::from_secs(2));
        assert_eq!(relay.cors_origin, "http://form.example.test");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let config = config::Config::builder()
            .set_override("port", "not-a-port")
            .unwrap()
            .build()
            .unwrap();

        assert!(RelayConfig::from_config(config).is_err());
    }
}
