//! Block structures produced by the external consensus engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// An ordered, immutable unit of ledger content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub data: BlockData,
    pub metadata: BlockMetadata,
}

impl Block {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("block is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        bincode::deserialize(bytes).map_err(|e| TypesError::decode("block", e))
    }

    /// Metadata entry at the given index, if the block carries one.
    pub fn metadata_at(&self, index: BlockMetadataIndex) -> Option<&[u8]> {
        self.metadata
            .metadata
            .get(index as usize)
            .map(Vec::as_slice)
    }
}

/// Block header: height plus the hash chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Monotonically increasing height.
    pub number: u64,
    pub previous_hash: [u8; 32],
    pub data_hash: [u8; 32],
}

impl BlockHeader {
    /// Canonical serialized form of the header. Ordering-node signatures
    /// cover these exact bytes, so the encoding must be deterministic.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("block header is always serializable")
    }
}

impl fmt::Display for BlockHeader {
    /// Blocks log as `#<height> (<data hash prefix>)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.number, hex::encode(&self.data_hash[..4]))
    }
}

/// The ordered envelopes carried by a block, each in marshalled form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    pub data: Vec<Vec<u8>>,
}

/// Per-block metadata entries, each in marshalled form, indexed by
/// [`BlockMetadataIndex`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub metadata: Vec<Vec<u8>>,
}

/// Well-known positions inside [`BlockMetadata`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockMetadataIndex {
    /// Ordering-node signatures over the block itself.
    Signatures = 0,
    /// Signatures over the last-config pointer.
    LastConfig = 1,
}

/// A decoded metadata entry: an opaque value plus the signatures over it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub value: Vec<u8>,
    pub signatures: Vec<MetadataSignature>,
}

impl Metadata {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("metadata is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        bincode::deserialize(bytes).map_err(|e| TypesError::decode("metadata", e))
    }
}

/// One ordering-node signature over a metadata entry. The signed bytes
/// are `value ∥ signature_header ∥ block header bytes`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSignature {
    /// Marshalled signature header identifying the signer.
    pub signature_header: Vec<u8>,
    pub signature: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block(number: u64) -> Block {
        Block {
            header: BlockHeader {
                number,
                previous_hash: [0x11; 32],
                data_hash: [0x22; 32],
            },
            data: BlockData {
                data: vec![vec![1, 2, 3]],
            },
            metadata: BlockMetadata {
                metadata: vec![vec![9, 9], vec![8]],
            },
        }
    }

    #[test]
    fn block_roundtrip() {
        let block = sample_block(7);
        let decoded = Block::from_bytes(&block.to_bytes()).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.header.number, 7);
    }

    #[test]
    fn header_bytes_deterministic() {
        let block = sample_block(3);
        assert_eq!(block.header.to_bytes(), block.header.to_bytes());
    }

    #[test]
    fn metadata_index_lookup() {
        let block = sample_block(1);
        assert_eq!(
            block.metadata_at(BlockMetadataIndex::Signatures),
            Some(&[9u8, 9][..])
        );
        assert_eq!(
            block.metadata_at(BlockMetadataIndex::LastConfig),
            Some(&[8u8][..])
        );
    }

    #[test]
    fn missing_metadata_entry_is_none() {
        let mut block = sample_block(1);
        block.metadata.metadata.truncate(1);
        assert!(block.metadata_at(BlockMetadataIndex::LastConfig).is_none());
    }

    #[test]
    fn truncated_block_rejected() {
        let bytes = sample_block(1).to_bytes();
        assert!(Block::from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }
}
