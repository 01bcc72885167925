//! Local Ed25519 MSP.
//!
//! Identities are Ed25519 public keys wrapped in a [`SerializedIdentity`].
//! When the MSP is loaded from a directory, every `*.pub` file (hex, one
//! 32-byte key) becomes a trusted root; creators outside that set are
//! rejected at deserialization. An MSP created without a directory
//! accepts any well-formed key, which is the posture used in tests and
//! single-trust-domain deployments.

use std::collections::HashSet;
use std::path::Path;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::error::MspError;
use crate::identity::{Identity, IdentityDeserializer, SerializedIdentity};

/// Length of an Ed25519 public key.
const PUBLIC_KEY_LEN: usize = 32;

/// An MSP backed by locally held Ed25519 key material.
pub struct LocalMsp {
    msp_id: String,
    trusted: Option<HashSet<[u8; PUBLIC_KEY_LEN]>>,
}

impl LocalMsp {
    /// An MSP that accepts any well-formed identity claiming `msp_id`.
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            trusted: None,
        }
    }

    /// Load an MSP from a directory of `*.pub` files, each containing a
    /// hex-encoded Ed25519 public key.
    pub fn load(dir: &Path, msp_id: impl Into<String>) -> Result<Self, MspError> {
        let mut trusted = HashSet::new();
        let entries = std::fs::read_dir(dir).map_err(|e| MspError::Load {
            path: dir.display().to_string(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| MspError::Load {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pub") {
                continue;
            }
            let name = path.display().to_string();
            let content = std::fs::read_to_string(&path).map_err(|e| MspError::Load {
                path: name.clone(),
                source: e,
            })?;
            let bytes =
                hex::decode(content.trim()).map_err(|_| MspError::BadKeyFile(name.clone()))?;
            let key: [u8; PUBLIC_KEY_LEN] = bytes
                .try_into()
                .map_err(|_| MspError::BadKeyFile(name.clone()))?;
            trusted.insert(key);
        }
        tracing::info!(
            dir = %dir.display(),
            roots = trusted.len(),
            "loaded local MSP"
        );
        Ok(Self {
            msp_id: msp_id.into(),
            trusted: Some(trusted),
        })
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }
}

impl IdentityDeserializer for LocalMsp {
    fn deserialize_identity(&self, raw: &[u8]) -> Result<Box<dyn Identity>, MspError> {
        let serialized = SerializedIdentity::from_bytes(raw)?;
        let key_bytes: [u8; PUBLIC_KEY_LEN] = serialized
            .public_key
            .as_slice()
            .try_into()
            .map_err(|_| MspError::BadPublicKey)?;
        if let Some(trusted) = &self.trusted {
            if !trusted.contains(&key_bytes) {
                return Err(MspError::UntrustedIdentity);
            }
        }
        let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| MspError::BadPublicKey)?;
        Ok(Box::new(Ed25519Identity {
            msp_id: serialized.msp_id,
            key,
        }))
    }
}

/// A deserialized Ed25519 identity.
struct Ed25519Identity {
    msp_id: String,
    key: VerifyingKey,
}

impl Identity for Ed25519Identity {
    fn msp_identifier(&self) -> &str {
        &self.msp_id
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), MspError> {
        let sig = Signature::from_slice(signature).map_err(|_| MspError::InvalidSignature)?;
        self.key
            .verify(message, &sig)
            .map_err(|_| MspError::InvalidSignature)
    }
}
