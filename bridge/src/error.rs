use thiserror::Error;

use pontoon_messages::CodecError;
use pontoon_types::{HeaderType, TypesError};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("decode error: {0}")]
    Types(#[from] TypesError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("send pool is not initialized — the system channel has not bootstrapped")]
    PoolNotReady,

    #[error("send pool is already initialized")]
    PoolAlreadyInitialized,

    #[error("failed to connect to consensus engine receive endpoint {addr}: {source}")]
    RecvConnect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("chain is exiting")]
    Halted,

    #[error("config message has no header")]
    MissingHeader,

    #[error("config message has no channel header")]
    MissingChannelHeader,

    #[error("unexpected envelope type {0:?}")]
    UnexpectedEnvelopeType(HeaderType),

    #[error("config envelope carries no last update")]
    MissingLastUpdate,

    #[error("config error: {0}")]
    Config(String),

    #[error("ledger error: {0}")]
    Ledger(String),
}
