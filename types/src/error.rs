//! Decode error type shared by every marshalled structure in this crate.

use thiserror::Error;

/// Error produced when a marshalled type cannot be decoded.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("failed to decode {kind}")]
    Decode {
        kind: &'static str,
        #[source]
        source: bincode::Error,
    },
}

impl TypesError {
    pub(crate) fn decode(kind: &'static str, source: bincode::Error) -> Self {
        Self::Decode { kind, source }
    }
}
