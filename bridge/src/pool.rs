//! Send pool — IPC connections to the external consensus engine.
//!
//! A fixed set of Unix-socket connections, each behind its own mutex,
//! plus one control connection used only for channel registration.
//! A round-robin index picks a slot per submission; the slot mutex keeps
//! the frames of one logical message contiguous on the wire while
//! distinct slots carry submissions concurrently.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::Mutex;

use pontoon_messages::frame;

use crate::error::BridgeError;

/// The process-wide pool of engine connections.
///
/// Created once by the system channel's bootstrap and shared by every
/// chain for the lifetime of the process. Connections are not reopened
/// on failure; a write error surfaces to the submitter and the slot
/// stays as it is.
pub struct SendPool {
    control: Mutex<UnixStream>,
    slots: Vec<Mutex<UnixStream>>,
    next: AtomicUsize,
}

impl SendPool {
    /// Assemble a pool from an established control connection and the
    /// dialed slot connections. Normally invoked by the bootstrap
    /// coordinator; exposed so harnesses can build a pool directly.
    pub fn new(control: UnixStream, slots: Vec<UnixStream>) -> Self {
        Self {
            control: Mutex::new(control),
            slots: slots.into_iter().map(Mutex::new).collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Number of slot connections.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Forward one serialized envelope to the engine.
    ///
    /// Advances the round-robin index, then writes
    /// `(channel_id: string, is_config: bool, payload: bytes)` under the
    /// selected slot's mutex so the three frames are never interleaved
    /// with a concurrent submission on the same slot.
    pub async fn submit(
        &self,
        channel_id: &str,
        is_config: bool,
        payload: &[u8],
    ) -> Result<(), BridgeError> {
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let mut conn = self.slots[slot].lock().await;
        frame::write_str(&mut *conn, channel_id).await?;
        frame::write_bool(&mut *conn, is_config).await?;
        frame::write_bytes(&mut *conn, payload).await?;
        conn.flush().await.map_err(BridgeError::Io)?;
        tracing::trace!(
            slot,
            channel = %channel_id,
            is_config,
            bytes = payload.len(),
            "submitted envelope to consensus engine"
        );
        Ok(())
    }

    /// Register a channel with the engine: `channel_id` followed by the
    /// batch timeout in nanoseconds, on the control connection.
    pub async fn register_channel(
        &self,
        channel_id: &str,
        batch_timeout: Duration,
    ) -> Result<(), BridgeError> {
        let mut control = self.control.lock().await;
        frame::write_str(&mut *control, channel_id).await?;
        frame::write_u64(&mut *control, batch_timeout.as_nanos() as u64).await?;
        control.flush().await.map_err(BridgeError::Io)?;
        tracing::info!(
            channel = %channel_id,
            timeout_ms = batch_timeout.as_millis() as u64,
            "registered channel with consensus engine"
        );
        Ok(())
    }
}
