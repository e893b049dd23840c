use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
///
/// Shared by both binaries; each one reads only the fields it needs.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Interface every listener binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Recommendation API port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Path of the product catalog CSV
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Where the recommender forwards its results
    #[serde(default = "default_aggregator_addr")]
    pub aggregator_addr: String,

    /// Raw TCP ingestion port on the aggregator
    #[serde(default = "default_ingest_port")]
    pub ingest_port: u16,

    /// Dashboard port on the aggregator
    #[serde(default = "default_dashboard_port")]
    pub dashboard_port: u16,

    /// Deadline for one forward exchange; unset waits forever
    #[serde(default)]
    pub forward_timeout_secs: Option<u64>,

    /// Largest batch the aggregator buffers from one connection
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: usize,

    /// Concurrent ingestion connections; unset is unbounded
    #[serde(default)]
    pub max_ingest_connections: Option<usize>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8082
}

fn default_catalog_path() -> String {
    "dataset2.csv".to_string()
}

fn default_aggregator_addr() -> String {
    "localhost:8080".to_string()
}

fn default_ingest_port() -> u16 {
    8080
}

fn default_dashboard_port() -> u16 {
    9090
}

fn default_max_batch_bytes() -> usize {
    8 * 1024 * 1024
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn api_addr(&self) -> anyhow::Result<SocketAddr> {
        socket_addr(&self.host, self.api_port)
    }

    pub fn ingest_addr(&self) -> anyhow::Result<SocketAddr> {
        socket_addr(&self.host, self.ingest_port)
    }

    pub fn dashboard_addr(&self) -> anyhow::Result<SocketAddr> {
        socket_addr(&self.host, self.dashboard_port)
    }

    pub fn forward_timeout(&self) -> Option<Duration> {
        self.forward_timeout_secs.map(Duration::from_secs)
    }
}

fn socket_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}:{}: {}", host, port, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]);

        assert_eq!(config.api_port, 8082);
        assert_eq!(config.ingest_port, 8080);
        assert_eq!(config.dashboard_port, 9090);
        assert_eq!(config.aggregator_addr, "localhost:8080");
        assert_eq!(config.catalog_path, "dataset2.csv");
        assert!(config.forward_timeout().is_none());
        assert!(config.max_ingest_connections.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("API_PORT", "18082"),
            ("FORWARD_TIMEOUT_SECS", "5"),
            ("MAX_INGEST_CONNECTIONS", "64"),
        ]);

        assert_eq!(config.api_addr().unwrap().to_string(), "127.0.0.1:18082");
        assert_eq!(config.forward_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.max_ingest_connections, Some(64));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = from_pairs(&[("HOST", "not a host")]);
        assert!(config.dashboard_addr().is_err());
    }
}
