//! Bridge configuration with TOML file support.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Configuration for the consensus bridge.
///
/// Can be loaded from a TOML file via [`BridgeConfig::from_toml_file`]
/// or built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Number of IPC connections in the send pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// TCP port the engine delivers ordered blocks on. Also determines
    /// the names of the IPC socket and the ready marker.
    #[serde(default = "default_recv_port")]
    pub recv_port: u16,

    /// Directory holding the engine's IPC socket and ready marker.
    /// Defaults to the OS temp directory.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Default batch timeout registered for a channel, in milliseconds.
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_pool_size() -> usize {
    10
}

fn default_recv_port() -> u16 {
    7100
}

fn default_state_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_batch_timeout_ms() -> u64 {
    1000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, BridgeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BridgeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, BridgeError> {
        toml::from_str(s).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("BridgeConfig is always serializable to TOML")
    }

    /// The per-channel batch timeout as a [`Duration`].
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            recv_port: default_recv_port(),
            state_dir: default_state_dir(),
            batch_timeout_ms: default_batch_timeout_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = BridgeConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = BridgeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.pool_size, config.pool_size);
        assert_eq!(parsed.recv_port, config.recv_port);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = BridgeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.recv_port, 7100);
        assert_eq!(config.batch_timeout_ms, 1000);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            pool_size = 2
            recv_port = 9999
        "#;
        let config = BridgeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.recv_port, 9999);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = BridgeConfig::from_toml_file("/nonexistent/pontoon.toml");
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }
}
