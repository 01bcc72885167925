//! Consenter factory and the ledger-facing support interface.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pontoon_types::Block;

use crate::chain::BridgeChain;
use crate::context::BridgeContext;
use crate::error::BridgeError;

/// Whether a channel is the distinguished system channel.
///
/// Exactly one chain per process carries [`ChannelRole::System`]; it
/// performs the engine bootstrap that every other chain depends on, so
/// it must be created and started first. The caller decides which
/// channel that is — the role is explicit rather than inferred from
/// creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelRole {
    System,
    Application,
}

/// Everything a chain needs from the channel it serves: its identity,
/// its batch timeout, and the ledger-append machinery. The ledger
/// itself lives outside the bridge, behind this trait.
#[async_trait]
pub trait ConsenterSupport: Send + Sync {
    /// The channel this support object belongs to.
    fn channel_id(&self) -> &str;

    /// Batch timeout registered with the engine for this channel.
    fn batch_timeout(&self) -> Duration;

    /// Append an ordered regular block to the ledger.
    async fn append_block(&self, block: Block) -> Result<(), BridgeError>;

    /// Apply a configuration block to the channel's config state.
    /// Called before the block is appended.
    async fn process_config_block(&self, block: &Block) -> Result<(), BridgeError>;
}

/// Creates one chain per channel, all sharing the process context.
///
/// Callers invoke [`Consenter::handle_chain`] serially during startup,
/// system channel first.
pub struct Consenter {
    ctx: Arc<BridgeContext>,
}

impl Consenter {
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        Self { ctx }
    }

    /// Create the chain for a channel. The returned chain is in the
    /// created state; call [`BridgeChain::start`] to bring it up.
    pub fn handle_chain(
        &self,
        support: Arc<dyn ConsenterSupport>,
        role: ChannelRole,
    ) -> Arc<BridgeChain> {
        tracing::info!(
            channel = %support.channel_id(),
            ?role,
            "creating bridge chain"
        );
        Arc::new(BridgeChain::new(Arc::clone(&self.ctx), support, role))
    }
}

/// In-memory [`ConsenterSupport`] used by the daemon's standalone mode
/// and by tests. Regular blocks are appended to a vector; config blocks
/// bump a config sequence before being appended.
pub struct MemoryLedger {
    channel_id: String,
    batch_timeout: Duration,
    blocks: Mutex<Vec<Block>>,
    config_seq: Mutex<u64>,
}

impl MemoryLedger {
    pub fn new(channel_id: impl Into<String>, batch_timeout: Duration) -> Self {
        Self {
            channel_id: channel_id.into(),
            batch_timeout,
            blocks: Mutex::new(Vec::new()),
            config_seq: Mutex::new(0),
        }
    }

    /// Number of blocks appended so far.
    pub async fn height(&self) -> u64 {
        self.blocks.lock().await.len() as u64
    }

    /// Snapshot of the appended blocks.
    pub async fn blocks(&self) -> Vec<Block> {
        self.blocks.lock().await.clone()
    }

    pub async fn config_seq(&self) -> u64 {
        *self.config_seq.lock().await
    }
}

#[async_trait]
impl ConsenterSupport for MemoryLedger {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn batch_timeout(&self) -> Duration {
        self.batch_timeout
    }

    async fn append_block(&self, block: Block) -> Result<(), BridgeError> {
        tracing::debug!(
            channel = %self.channel_id,
            number = block.header.number,
            "appending block"
        );
        self.blocks.lock().await.push(block);
        Ok(())
    }

    async fn process_config_block(&self, block: &Block) -> Result<(), BridgeError> {
        tracing::debug!(
            channel = %self.channel_id,
            number = block.header.number,
            "processing config block"
        );
        *self.config_seq.lock().await += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pontoon_types::{BlockData, BlockHeader, BlockMetadata};

    fn block(number: u64) -> Block {
        Block {
            header: BlockHeader {
                number,
                previous_hash: [0; 32],
                data_hash: [0; 32],
            },
            data: BlockData::default(),
            metadata: BlockMetadata::default(),
        }
    }

    #[tokio::test]
    async fn memory_ledger_appends_in_order() {
        let ledger = MemoryLedger::new("testchannel", Duration::from_secs(1));
        ledger.append_block(block(0)).await.unwrap();
        ledger.append_block(block(1)).await.unwrap();
        assert_eq!(ledger.height().await, 2);
        let blocks = ledger.blocks().await;
        assert_eq!(blocks[0].header.number, 0);
        assert_eq!(blocks[1].header.number, 1);
    }

    #[tokio::test]
    async fn config_blocks_advance_config_seq() {
        let ledger = MemoryLedger::new("testchannel", Duration::from_secs(1));
        let b = block(1);
        ledger.process_config_block(&b).await.unwrap();
        ledger.append_block(b).await.unwrap();
        assert_eq!(ledger.config_seq().await, 1);
        assert_eq!(ledger.height().await, 1);
    }
}
