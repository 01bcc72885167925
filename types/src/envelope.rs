//! Envelope and payload structures.
//!
//! An [`Envelope`] is the signed submission unit of the ordering service.
//! The bridge treats envelopes as opaque byte strings, with one
//! exception: configuration envelopes expose a channel header whose type
//! discriminates a direct config update from one wrapped in an orderer
//! transaction, and carry a nested `last_update` envelope that is
//! forwarded in place of the outer envelope.
//!
//! Nested headers (`channel_header`, `signature_header`) are stored in
//! their marshalled form, as the outer schema treats them opaquely.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// A signed message containing a marshalled payload and a signature over it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Marshalled [`Payload`].
    pub payload: Vec<u8>,
    /// Signature by the creator identified in the payload's signature header.
    pub signature: Vec<u8>,
}

impl Envelope {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("envelope is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        bincode::deserialize(bytes).map_err(|e| TypesError::decode("envelope", e))
    }
}

/// The content of an envelope: a header describing the message and the
/// message data itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub header: Option<Header>,
    /// Type-dependent content; interpreted according to the channel
    /// header's [`HeaderType`].
    pub data: Vec<u8>,
}

impl Payload {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("payload is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        bincode::deserialize(bytes).map_err(|e| TypesError::decode("payload", e))
    }
}

/// Paired channel and signature headers, both in marshalled form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Marshalled [`ChannelHeader`].
    pub channel_header: Vec<u8>,
    /// Marshalled [`SignatureHeader`].
    pub signature_header: Vec<u8>,
}

/// Identifies the message type, originating channel, and transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHeader {
    pub header_type: HeaderType,
    pub channel_id: String,
    pub tx_id: String,
    pub epoch: u64,
}

impl ChannelHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("channel header is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        bincode::deserialize(bytes).map_err(|e| TypesError::decode("channel header", e))
    }
}

/// Message type carried in a channel header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderType {
    /// An opaque application message.
    #[default]
    Message,
    /// A channel configuration block message.
    Config,
    /// A transaction proposing a configuration change.
    ConfigUpdate,
    /// An endorsed application transaction.
    EndorserTransaction,
    /// A system-channel transaction wrapping a config message for
    /// another channel.
    OrdererTransaction,
    /// A deliver seek request.
    DeliverSeekInfo,
}

/// Creator identity plus an anti-replay nonce.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHeader {
    /// Marshalled serialized identity of the message creator.
    pub creator: Vec<u8>,
    pub nonce: Vec<u8>,
}

impl SignatureHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("signature header is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        bincode::deserialize(bytes).map_err(|e| TypesError::decode("signature header", e))
    }
}

/// The payload of a `Config` message: the current channel configuration
/// plus the update envelope that produced it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEnvelope {
    /// Marshalled channel configuration.
    pub config: Vec<u8>,
    /// The last configuration-update envelope applied. This is what the
    /// bridge forwards to the consensus engine in place of the outer
    /// envelope.
    pub last_update: Option<Envelope>,
}

impl ConfigEnvelope {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("config envelope is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        bincode::deserialize(bytes).map_err(|e| TypesError::decode("config envelope", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_roundtrip() {
        let env = Envelope {
            payload: vec![1, 2, 3],
            signature: vec![4, 5, 6],
        };
        let decoded = Envelope::from_bytes(&env.to_bytes()).unwrap();
        assert_eq!(decoded, env);
    }

    #[test]
    fn payload_with_header_roundtrip() {
        let chdr = ChannelHeader {
            header_type: HeaderType::Config,
            channel_id: "testchannel".into(),
            tx_id: "tx-1".into(),
            epoch: 0,
        };
        let payload = Payload {
            header: Some(Header {
                channel_header: chdr.to_bytes(),
                signature_header: Vec::new(),
            }),
            data: vec![0xCA, 0xFE],
        };
        let decoded = Payload::from_bytes(&payload.to_bytes()).unwrap();
        let decoded_chdr =
            ChannelHeader::from_bytes(&decoded.header.unwrap().channel_header).unwrap();
        assert_eq!(decoded_chdr.header_type, HeaderType::Config);
        assert_eq!(decoded_chdr.channel_id, "testchannel");
    }

    #[test]
    fn corrupt_envelope_rejected() {
        let garbage = vec![0xFF, 0xDE, 0xAD];
        assert!(Envelope::from_bytes(&garbage).is_err());
    }

    #[test]
    fn config_envelope_carries_last_update() {
        let update = Envelope {
            payload: vec![0xCA, 0xFE],
            signature: Vec::new(),
        };
        let cfg = ConfigEnvelope {
            config: vec![9],
            last_update: Some(update.clone()),
        };
        let decoded = ConfigEnvelope::from_bytes(&cfg.to_bytes()).unwrap();
        assert_eq!(decoded.last_update, Some(update));
    }
}
