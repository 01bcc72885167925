//! Wire layer for the pontoon ordering bridge.
//!
//! Two pieces live here:
//! - [`frame`] — the length-prefixed binary codec spoken on every IPC
//!   and TCP connection to the external consensus engine;
//! - [`deliver`] — the seek/response messages of the block delivery
//!   protocol consumed by client tools.

pub mod deliver;
pub mod error;
pub mod frame;

pub use deliver::{DeliverResponse, DeliverStatus, SeekBehavior, SeekInfo, SeekPosition};
pub use error::CodecError;
