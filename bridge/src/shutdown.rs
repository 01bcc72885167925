//! Signal-driven shutdown for bridge processes.
//!
//! The controller owns the chains a process runs: each chain is placed
//! under management with [`ShutdownController::register`], and when
//! SIGINT/SIGTERM arrives (or [`ShutdownController::shutdown`] is called
//! programmatically) every registered chain is halted. Chain halts are
//! latched, so repeated shutdowns are harmless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::signal;

use crate::chain::BridgeChain;

/// Halts every registered chain when the process is asked to stop.
pub struct ShutdownController {
    chains: Mutex<Vec<Arc<BridgeChain>>>,
    down: AtomicBool,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            chains: Mutex::new(Vec::new()),
            down: AtomicBool::new(false),
        }
    }

    /// Place a chain under this controller's management. A chain
    /// registered after shutdown has already been triggered is halted
    /// on the spot.
    pub fn register(&self, chain: Arc<BridgeChain>) {
        let mut chains = self.chains.lock().expect("shutdown registry poisoned");
        if self.down.load(Ordering::SeqCst) {
            drop(chains);
            chain.halt();
            return;
        }
        chains.push(chain);
    }

    /// Halt every registered chain.
    pub fn shutdown(&self) {
        let chains = self.chains.lock().expect("shutdown registry poisoned");
        self.down.store(true, Ordering::SeqCst);
        for chain in chains.iter() {
            chain.halt();
        }
    }

    /// Wait for SIGTERM or SIGINT, then halt every registered chain.
    pub async fn run_until_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, halting chains"); }
            _ = terminate => { tracing::info!("received SIGTERM, halting chains"); }
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
