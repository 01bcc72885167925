//! The per-channel chain pipeline.
//!
//! Submit path: [`BridgeChain::order`] / [`BridgeChain::configure`]
//! serialize the envelope and push it to the engine through the shared
//! send pool. Ordering acknowledgement is asynchronous — the envelope
//! eventually comes back inside an ordered block on the receive stream.
//!
//! Receive path: a dedicated task reads `(block, type-tag)` frame pairs
//! from the chain's TCP connection and dispatches each block onto the
//! regular or config queue; a second task drains those queues into the
//! ledger. The two queues are independent streams, mirroring the
//! engine's semantics: order is preserved within each, not across them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};

use pontoon_messages::{frame, CodecError};
use pontoon_types::{Block, Envelope};

use crate::bootstrap;
use crate::consenter::{ChannelRole, ConsenterSupport};
use crate::context::BridgeContext;
use crate::error::BridgeError;
use crate::metrics::BridgeMetrics;

/// Capacity of each of the regular/config block queues.
const BLOCK_QUEUE_DEPTH: usize = 64;

/// Block-type tag marking a config block on the receive stream.
const CONFIG_BLOCK_TAG: u8 = 0x01;

/// One channel's bridge to the consensus engine.
pub struct BridgeChain {
    ctx: Arc<BridgeContext>,
    support: Arc<dyn ConsenterSupport>,
    role: ChannelRole,
    halt_latch: AtomicBool,
    halt_tx: watch::Sender<bool>,
}

impl BridgeChain {
    pub(crate) fn new(
        ctx: Arc<BridgeContext>,
        support: Arc<dyn ConsenterSupport>,
        role: ChannelRole,
    ) -> Self {
        let (halt_tx, _) = watch::channel(false);
        Self {
            ctx,
            support,
            role,
            halt_latch: AtomicBool::new(false),
            halt_tx,
        }
    }

    pub fn channel_id(&self) -> &str {
        self.support.channel_id()
    }

    pub fn is_system_channel(&self) -> bool {
        self.role == ChannelRole::System
    }

    /// Bring the chain up: bootstrap the engine connection (system
    /// channel only), connect the receive stream, register the channel,
    /// and spawn the receive and append loops.
    pub async fn start(&self) -> Result<(), BridgeError> {
        let channel_id = self.support.channel_id().to_string();
        tracing::info!(channel = %channel_id, "starting bridge chain");

        if self.is_system_channel() {
            bootstrap::bootstrap_send_pool(&self.ctx).await?;
        }
        let pool = self.ctx.pool()?;

        let recv_addr = self.ctx.endpoints().recv_addr.clone();
        let recv_conn =
            TcpStream::connect(&recv_addr)
                .await
                .map_err(|source| BridgeError::RecvConnect {
                    addr: recv_addr,
                    source,
                })?;

        pool.register_channel(&channel_id, self.support.batch_timeout())
            .await?;

        let (regular_tx, regular_rx) = mpsc::channel(BLOCK_QUEUE_DEPTH);
        let (config_tx, config_rx) = mpsc::channel(BLOCK_QUEUE_DEPTH);

        tokio::spawn(receive_loop(
            channel_id.clone(),
            recv_conn,
            regular_tx,
            config_tx,
            self.halt_tx.subscribe(),
            Arc::clone(self.ctx.metrics()),
        ));
        tokio::spawn(append_loop(
            channel_id,
            Arc::clone(&self.support),
            regular_rx,
            config_rx,
            self.halt_tx.subscribe(),
            Arc::clone(self.ctx.metrics()),
        ));

        self.ctx.metrics().active_chains.inc();
        Ok(())
    }

    /// Submit a regular envelope for ordering. The envelope is opaque to
    /// the bridge. Only IPC-level failures are reported here; acceptance
    /// into a block is observed on the receive stream.
    pub async fn order(&self, envelope: Envelope, _config_seq: u64) -> Result<(), BridgeError> {
        let bytes = envelope.to_bytes();
        self.ctx
            .pool()?
            .submit(self.channel_id(), false, &bytes)
            .await?;
        self.ctx.metrics().envelopes_submitted.inc();
        self.check_exit()
    }

    /// Submit a configuration message for ordering. The inner update
    /// envelope is extracted first; if extraction fails nothing is sent.
    pub async fn configure(&self, envelope: Envelope, _config_seq: u64) -> Result<(), BridgeError> {
        let update = crate::config_msg::extract_last_update(&envelope)?;
        let bytes = update.to_bytes();
        self.ctx
            .pool()?
            .submit(self.channel_id(), true, &bytes)
            .await?;
        self.ctx.metrics().config_envelopes_submitted.inc();
        self.check_exit()
    }

    /// Readiness gate for submitters. Bootstrap readiness is enforced at
    /// [`BridgeChain::start`], so this always succeeds.
    pub fn wait_ready(&self) -> Result<(), BridgeError> {
        Ok(())
    }

    /// A signal that flips to `true` when the chain halts.
    pub fn halted(&self) -> watch::Receiver<bool> {
        self.halt_tx.subscribe()
    }

    /// Stop the chain. Safe to call any number of times; only the first
    /// call transitions the exit signal.
    pub fn halt(&self) {
        if self.halt_latch.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(channel = %self.channel_id(), "halting bridge chain");
        self.halt_tx.send_replace(true);
        self.ctx.metrics().active_chains.dec();
    }

    fn check_exit(&self) -> Result<(), BridgeError> {
        if *self.halt_tx.borrow() {
            Err(BridgeError::Halted)
        } else {
            Ok(())
        }
    }
}

/// Read `(block bytes, type tag)` frame pairs from the engine and
/// dispatch each block to the matching queue.
///
/// A frame pair that fails to decode is logged and skipped — one bad
/// block must not kill the channel. A connection-level I/O error ends
/// the loop: the engine is gone and the core does not reconnect.
async fn receive_loop(
    channel_id: String,
    mut conn: TcpStream,
    regular_tx: mpsc::Sender<Block>,
    config_tx: mpsc::Sender<Block>,
    mut halt: watch::Receiver<bool>,
    metrics: Arc<BridgeMetrics>,
) {
    loop {
        let frames = tokio::select! {
            result = read_block_frames(&mut conn) => result,
            _ = halt.changed() => {
                tracing::debug!(channel = %channel_id, "receive loop stopping");
                return;
            }
        };

        let (block_bytes, tag) = match frames {
            Ok(pair) => pair,
            Err(e) if e.is_connection_error() => {
                tracing::warn!(
                    channel = %channel_id,
                    error = %e,
                    "receive connection to consensus engine closed"
                );
                return;
            }
            Err(e) => {
                tracing::debug!(
                    channel = %channel_id,
                    error = %e,
                    "malformed frame on receive stream, skipping"
                );
                metrics.recv_decode_failures.inc();
                continue;
            }
        };

        let block = match Block::from_bytes(&block_bytes) {
            Ok(block) => block,
            Err(e) => {
                tracing::debug!(
                    channel = %channel_id,
                    error = %e,
                    "received bytes do not decode as a block, skipping"
                );
                metrics.recv_decode_failures.inc();
                continue;
            }
        };

        let Some(&tag_byte) = tag.first() else {
            tracing::debug!(channel = %channel_id, "received empty block-type tag, skipping");
            metrics.recv_decode_failures.inc();
            continue;
        };

        if tag_byte == CONFIG_BLOCK_TAG {
            metrics.config_blocks_received.inc();
            if config_tx.send(block).await.is_err() {
                return;
            }
        } else {
            metrics.blocks_received.inc();
            if regular_tx.send(block).await.is_err() {
                return;
            }
        }
    }
}

async fn read_block_frames(conn: &mut TcpStream) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
    let block_bytes = frame::read_bytes(conn).await?;
    let tag = frame::read_bytes(conn).await?;
    Ok((block_bytes, tag))
}

/// Drain the block queues into the ledger.
///
/// A failure to append, or to process a config block, leaves the ledger
/// and the engine's view divergent — unrecoverable, so the process goes
/// down.
async fn append_loop(
    channel_id: String,
    support: Arc<dyn ConsenterSupport>,
    mut regular_rx: mpsc::Receiver<Block>,
    mut config_rx: mpsc::Receiver<Block>,
    mut halt: watch::Receiver<bool>,
    metrics: Arc<BridgeMetrics>,
) {
    loop {
        tokio::select! {
            Some(block) = regular_rx.recv() => {
                let number = block.header.number;
                if let Err(e) = support.append_block(block).await {
                    tracing::error!(
                        channel = %channel_id,
                        number,
                        error = %e,
                        "could not append regular block"
                    );
                    panic!("could not append regular block: {e}");
                }
                metrics.blocks_appended.inc();
            }
            Some(block) = config_rx.recv() => {
                let number = block.header.number;
                tracing::debug!(
                    channel = %channel_id,
                    number,
                    "received successfully ordered config block"
                );
                if let Err(e) = support.process_config_block(&block).await {
                    tracing::error!(
                        channel = %channel_id,
                        number,
                        error = %e,
                        "could not process config block"
                    );
                    panic!("could not process config block: {e}");
                }
                if let Err(e) = support.append_block(block).await {
                    tracing::error!(
                        channel = %channel_id,
                        number,
                        error = %e,
                        "could not append config block"
                    );
                    panic!("could not append config block: {e}");
                }
                metrics.blocks_appended.inc();
            }
            _ = halt.changed() => {
                tracing::debug!(channel = %channel_id, "append loop exiting");
                return;
            }
            else => return,
        }
    }
}
