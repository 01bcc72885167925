use thiserror::Error;

/// Errors produced by the framed wire codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {0} bytes exceeds the {max} byte limit", max = crate::frame::MAX_FRAME_SIZE)]
    FrameTooLarge(u64),

    #[error("boolean frame has length {0}, expected 1")]
    BadBoolLength(u64),

    #[error("invalid boolean byte {0:#04x}")]
    BadBoolValue(u8),

    #[error("string frame is not valid UTF-8")]
    BadUtf8(#[from] std::string::FromUtf8Error),

    #[error("failed to decode message body")]
    BadMessage(#[source] bincode::Error),
}

impl CodecError {
    /// Whether the error came from the underlying connection rather than
    /// from the content of a frame. Connection errors are terminal for a
    /// stream; content errors may be skipped by best-effort readers.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, CodecError::Io(_))
    }
}
