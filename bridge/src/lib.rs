//! Per-channel bridge between the ordering service and an external
//! BFT consensus engine running as a separate process.
//!
//! Each channel gets one [`chain::BridgeChain`], which forwards
//! client-submitted envelopes to the engine over a pooled IPC transport
//! and receives totally-ordered blocks back over a framed TCP stream,
//! dispatching them to the ledger-append machinery. The engine is the
//! source of truth for ordering and batching; the bridge holds no
//! persistent state of its own.
//!
//! Process-wide resources (the send pool, its control connection, the
//! engine endpoints) live in a [`context::BridgeContext`] created at
//! startup and shared by every chain. The system channel's chain
//! performs the one-time engine bootstrap that populates the pool.

pub mod bootstrap;
pub mod chain;
pub mod config;
pub mod config_msg;
pub mod consenter;
pub mod context;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod shutdown;

pub use chain::BridgeChain;
pub use config::BridgeConfig;
pub use config_msg::extract_last_update;
pub use consenter::{ChannelRole, Consenter, ConsenterSupport, MemoryLedger};
pub use context::{BridgeContext, Endpoints};
pub use error::BridgeError;
pub use metrics::BridgeMetrics;
pub use pool::SendPool;
pub use shutdown::ShutdownController;
