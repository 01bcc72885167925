//! One-time engine bootstrap, performed by the system channel's chain.
//!
//! The engine signals readiness by creating a marker file next to its
//! IPC socket. The bridge polls for that marker (indefinitely — the
//! engine may take arbitrarily long to come up), deletes it, then dials
//! the control connection and the send-pool connections. Any dial
//! failure at this stage is fatal: without a pool no channel can
//! operate, so the process goes down rather than limping.

use std::path::Path;
use std::time::Duration;

use tokio::net::UnixStream;

use crate::context::BridgeContext;
use crate::error::BridgeError;
use crate::pool::SendPool;

/// How often the ready marker is polled for.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wait for the engine, dial the control and pool connections, and
/// install the pool into the context latch.
pub(crate) async fn bootstrap_send_pool(ctx: &BridgeContext) -> Result<(), BridgeError> {
    let endpoints = ctx.endpoints();

    tracing::info!("waiting for consensus engine to become ready");
    wait_for_ready_marker(&endpoints.ready_marker).await;

    if let Err(e) = tokio::fs::remove_file(&endpoints.ready_marker).await {
        tracing::warn!(
            marker = %endpoints.ready_marker.display(),
            error = %e,
            "could not delete ready marker"
        );
    }

    let control = match UnixStream::connect(&endpoints.socket_path).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(
                socket = %endpoints.socket_path.display(),
                error = %e,
                "could not open control connection to consensus engine"
            );
            panic!("could not open control connection to consensus engine: {e}");
        }
    };

    let pool_size = ctx.config().pool_size;
    let mut slots = Vec::with_capacity(pool_size);
    for i in 0..pool_size {
        match UnixStream::connect(&endpoints.socket_path).await {
            Ok(conn) => {
                tracing::debug!(slot = i, "created pool connection");
                slots.push(conn);
            }
            Err(e) => {
                tracing::error!(
                    slot = i,
                    socket = %endpoints.socket_path.display(),
                    error = %e,
                    "could not create pool connection to consensus engine"
                );
                panic!("could not create pool connection to consensus engine: {e}");
            }
        }
    }

    tracing::info!(size = pool_size, "created connection pool to consensus engine");
    ctx.install_pool(SendPool::new(control, slots))
}

/// Block until the ready marker exists. No timeout: bootstrap holds the
/// system channel until the engine shows up.
async fn wait_for_ready_marker(path: &Path) {
    loop {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return;
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}
