//! Local signing identity.
//!
//! Used by client tools to sign seek envelopes, and by test fixtures to
//! produce block signatures that verify against a [`crate::LocalMsp`].

use std::path::Path;

use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;

use pontoon_types::SignatureHeader;

use crate::error::MspError;
use crate::identity::SerializedIdentity;

/// An Ed25519 signing identity bound to an MSP.
pub struct LocalSigner {
    msp_id: String,
    key: SigningKey,
}

impl LocalSigner {
    /// Generate a fresh signing key.
    pub fn generate(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic key from a 32-byte seed.
    pub fn from_seed(msp_id: impl Into<String>, seed: &[u8; 32]) -> Self {
        Self {
            msp_id: msp_id.into(),
            key: SigningKey::from_bytes(seed),
        }
    }

    /// Load a signing key from a hex seed file.
    pub fn from_key_file(msp_id: impl Into<String>, path: &Path) -> Result<Self, MspError> {
        let name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| MspError::Load {
            path: name.clone(),
            source: e,
        })?;
        let bytes = hex::decode(content.trim()).map_err(|_| MspError::BadKeyFile(name.clone()))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|_| MspError::BadKeyFile(name))?;
        Ok(Self::from_seed(msp_id, &seed))
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Sign a message, returning the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.key.sign(message).to_bytes().to_vec()
    }

    /// The marshalled identity this signer presents as a creator.
    pub fn serialized_identity(&self) -> Vec<u8> {
        SerializedIdentity {
            msp_id: self.msp_id.clone(),
            public_key: self.public_key_bytes().to_vec(),
        }
        .to_bytes()
    }

    /// A fresh signature header naming this signer as creator.
    pub fn new_signature_header(&self) -> SignatureHeader {
        let mut nonce = vec![0u8; 24];
        OsRng.fill_bytes(&mut nonce);
        SignatureHeader {
            creator: self.serialized_identity(),
            nonce,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_signer_is_deterministic() {
        let a = LocalSigner::from_seed("OrdererOrg", &[9u8; 32]);
        let b = LocalSigner::from_seed("OrdererOrg", &[9u8; 32]);
        assert_eq!(a.public_key_bytes(), b.public_key_bytes());
        assert_eq!(a.sign(b"msg"), b.sign(b"msg"));
    }

    #[test]
    fn signature_header_names_signer() {
        let signer = LocalSigner::from_seed("OrdererOrg", &[3u8; 32]);
        let header = signer.new_signature_header();
        let identity = SerializedIdentity::from_bytes(&header.creator).unwrap();
        assert_eq!(identity.msp_id, "OrdererOrg");
        assert_eq!(identity.public_key, signer.public_key_bytes().to_vec());
        assert_eq!(header.nonce.len(), 24);
    }

    #[test]
    fn key_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signer.key");
        std::fs::write(&path, hex::encode([5u8; 32])).unwrap();
        let signer = LocalSigner::from_key_file("OrdererOrg", &path).unwrap();
        let expected = LocalSigner::from_seed("OrdererOrg", &[5u8; 32]);
        assert_eq!(signer.public_key_bytes(), expected.public_key_bytes());
    }
}
