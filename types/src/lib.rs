//! Fundamental types for the pontoon ordering bridge.
//!
//! This crate defines the data model shared across every other crate in
//! the workspace: envelopes (the signed submission unit of the ordering
//! service), blocks (the ordered unit produced by consensus), and the
//! header/metadata structures both carry.

pub mod block;
pub mod envelope;
pub mod error;

pub use block::{
    Block, BlockData, BlockHeader, BlockMetadata, BlockMetadataIndex, Metadata, MetadataSignature,
};
pub use envelope::{
    ChannelHeader, ConfigEnvelope, Envelope, Header, HeaderType, Payload, SignatureHeader,
};
pub use error::TypesError;
