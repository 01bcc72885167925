//! Client configuration with TOML file support.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Configuration for the delivery client. CLI flags override these
/// values when both are given.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Delivery endpoint of the ordering service (host:port).
    #[serde(default = "default_server")]
    pub server: String,

    /// Channel to deliver blocks from.
    #[serde(default = "default_channel")]
    pub channel_id: String,

    /// Directory holding the local MSP material (`*.pub` trusted keys,
    /// optional `signer.key`). When absent, any well-formed identity is
    /// accepted and an ephemeral signing key is used.
    #[serde(default)]
    pub msp_dir: Option<PathBuf>,

    /// Identifier of the local MSP.
    #[serde(default = "default_msp_id")]
    pub msp_id: String,
}

fn default_server() -> String {
    "127.0.0.1:7050".to_string()
}

fn default_channel() -> String {
    "system-channel".to_string()
}

fn default_msp_id() -> String {
    "OrdererMSP".to_string()
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ClientError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ClientError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            channel_id: default_channel(),
            msp_dir: None,
            msp_id: default_msp_id(),
        }
    }
}
