use thiserror::Error;

use pontoon_messages::CodecError;
use pontoon_msp::MspError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("config error: {0}")]
    Config(String),

    #[error("MSP error: {0}")]
    Msp(#[from] MspError),
}
