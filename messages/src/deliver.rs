//! Block delivery protocol messages.
//!
//! A delivery session is one framed stream: the client sends a single
//! seek envelope, then reads [`DeliverResponse`] frames until the stream
//! closes or a status arrives. Each message travels as one `bytes` frame
//! (see [`crate::frame`]) containing its bincode encoding.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Where a seek starts or stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekPosition {
    /// The oldest block the service retains.
    Oldest,
    /// The newest block at the time the seek is served.
    Newest,
    /// A specific block height.
    Specified(u64),
}

/// What the service does when the requested range runs past the chain tip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekBehavior {
    /// Hold the stream open and deliver blocks as they are produced.
    BlockUntilReady,
    /// Fail the seek instead of waiting.
    FailIfNotReady,
}

/// A seek request: deliver blocks from `start` through `stop` inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekInfo {
    pub start: SeekPosition,
    pub stop: SeekPosition,
    pub behavior: SeekBehavior,
}

impl SeekInfo {
    /// From the oldest retained block, forever.
    pub fn oldest() -> Self {
        Self {
            start: SeekPosition::Oldest,
            stop: SeekPosition::Specified(u64::MAX),
            behavior: SeekBehavior::BlockUntilReady,
        }
    }

    /// From the newest block, forever.
    pub fn newest() -> Self {
        Self {
            start: SeekPosition::Newest,
            stop: SeekPosition::Specified(u64::MAX),
            behavior: SeekBehavior::BlockUntilReady,
        }
    }

    /// Exactly block `number`.
    pub fn single(number: u64) -> Self {
        Self {
            start: SeekPosition::Specified(number),
            stop: SeekPosition::Specified(number),
            behavior: SeekBehavior::BlockUntilReady,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("seek info is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(CodecError::BadMessage)
    }
}

/// One message from the delivery service to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliverResponse {
    /// Terminal status; the stream ends after this.
    Status(DeliverStatus),
    /// One delivered block.
    Block(pontoon_types::Block),
}

impl DeliverResponse {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("deliver response is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(CodecError::BadMessage)
    }
}

/// Terminal stream status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliverStatus {
    Success,
    BadRequest,
    NotFound,
    ServiceUnavailable,
}
