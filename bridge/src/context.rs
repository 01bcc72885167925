//! Process-wide bridge state.
//!
//! Everything every chain shares — the engine endpoints, the send pool,
//! the metrics registry — lives in one [`BridgeContext`] value created
//! at process start and injected into each chain. The pool cell is a
//! one-shot latch: the system channel's bootstrap fills it exactly once,
//! and every other chain reads it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::metrics::BridgeMetrics;
use crate::pool::SendPool;

/// Engine endpoints derived from the configured state directory and
/// receive port. The names are part of the engine's wire contract.
#[derive(Clone, Debug)]
pub struct Endpoints {
    /// Unix socket the engine accepts control and pool connections on.
    pub socket_path: PathBuf,
    /// File the engine creates once its listeners are up.
    pub ready_marker: PathBuf,
    /// TCP address ordered blocks are delivered from.
    pub recv_addr: String,
}

impl Endpoints {
    pub fn derive(state_dir: &Path, recv_port: u16) -> Self {
        Self {
            socket_path: state_dir.join(format!("hlf-pool-{recv_port}.sock")),
            ready_marker: state_dir.join(format!("hlf-proxy-{recv_port}.ready")),
            recv_addr: format!("localhost:{recv_port}"),
        }
    }
}

/// Shared state for every chain in the process.
pub struct BridgeContext {
    config: BridgeConfig,
    endpoints: Endpoints,
    pool: OnceCell<SendPool>,
    metrics: Arc<BridgeMetrics>,
}

impl BridgeContext {
    pub fn new(config: BridgeConfig) -> Arc<Self> {
        let endpoints = Endpoints::derive(&config.state_dir, config.recv_port);
        Arc::new(Self {
            config,
            endpoints,
            pool: OnceCell::new(),
            metrics: Arc::new(BridgeMetrics::new()),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn metrics(&self) -> &Arc<BridgeMetrics> {
        &self.metrics
    }

    /// The send pool, if the system channel has bootstrapped it.
    pub fn pool(&self) -> Result<&SendPool, BridgeError> {
        self.pool.get().ok_or(BridgeError::PoolNotReady)
    }

    /// Install the bootstrapped pool. Fails if a pool is already in
    /// place — bootstrap runs once per process.
    pub(crate) fn install_pool(&self, pool: SendPool) -> Result<(), BridgeError> {
        self.pool
            .set(pool)
            .map_err(|_| BridgeError::PoolAlreadyInitialized)
    }
}
