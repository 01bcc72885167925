//! Identity interfaces consumed by signature verification.

use serde::{Deserialize, Serialize};

use crate::error::MspError;

/// The marshalled form an identity travels in: the MSP it belongs to
/// plus its raw public key. This is what a signature header's `creator`
/// field contains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub msp_id: String,
    pub public_key: Vec<u8>,
}

impl SerializedIdentity {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("serialized identity is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MspError> {
        bincode::deserialize(bytes).map_err(MspError::BadIdentity)
    }
}

/// A resolved identity capable of verifying signatures it produced.
pub trait Identity: Send + Sync {
    /// The identifier of the MSP this identity belongs to.
    fn msp_identifier(&self) -> &str;

    /// Verify `signature` over `message`.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), MspError>;
}

/// Turns raw creator bytes into a usable [`Identity`].
pub trait IdentityDeserializer: Send + Sync {
    fn deserialize_identity(&self, raw: &[u8]) -> Result<Box<dyn Identity>, MspError>;
}
