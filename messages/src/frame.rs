//! Length-prefixed binary codec for engine-facing connections.
//!
//! Every logical value on the wire is prefixed by an 8-byte big-endian
//! length, followed by the payload. Primitives:
//!
//! | value        | on-wire                                |
//! |--------------|----------------------------------------|
//! | length / u64 | 8 bytes big-endian (no prefix)         |
//! | u32          | 4 bytes big-endian (no prefix)         |
//! | bool         | length `1`, then one byte `0x00`/`0x01`|
//! | string       | length, then UTF-8 bytes               |
//! | bytes        | length, then raw bytes                 |
//!
//! Reads block until the full length and the full payload have arrived;
//! there are no partial returns, and every error propagates. The codec
//! keeps no state between calls.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::CodecError;

/// Upper bound on a single frame payload. Protects readers from
/// allocating against a corrupt or hostile length word.
pub const MAX_FRAME_SIZE: u64 = 128 * 1024 * 1024;

/// Write an 8-byte big-endian length word.
pub async fn write_len<W>(w: &mut W, len: u64) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    w.write_all(&len.to_be_bytes()).await?;
    Ok(())
}

/// Write a u64 as 8 raw big-endian bytes.
pub async fn write_u64<W>(w: &mut W, value: u64) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    w.write_all(&value.to_be_bytes()).await?;
    Ok(())
}

/// Write a u32 as 4 raw big-endian bytes.
pub async fn write_u32<W>(w: &mut W, value: u32) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    w.write_all(&value.to_be_bytes()).await?;
    Ok(())
}

/// Write a boolean as a one-byte frame.
pub async fn write_bool<W>(w: &mut W, value: bool) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    write_len(w, 1).await?;
    w.write_all(&[u8::from(value)]).await?;
    Ok(())
}

/// Write a string as a length-prefixed UTF-8 frame.
pub async fn write_str<W>(w: &mut W, value: &str) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    write_len(w, value.len() as u64).await?;
    w.write_all(value.as_bytes()).await?;
    Ok(())
}

/// Write a byte string as a length-prefixed frame.
pub async fn write_bytes<W>(w: &mut W, value: &[u8]) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    write_len(w, value.len() as u64).await?;
    w.write_all(value).await?;
    Ok(())
}

/// Read an 8-byte big-endian length word.
pub async fn read_len<R>(r: &mut R) -> Result<u64, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).await?;
    Ok(u64::from_be_bytes(buf))
}

/// Read a u64 encoded as 8 raw big-endian bytes.
pub async fn read_u64<R>(r: &mut R) -> Result<u64, CodecError>
where
    R: AsyncRead + Unpin,
{
    read_len(r).await
}

/// Read a u32 encoded as 4 raw big-endian bytes.
pub async fn read_u32<R>(r: &mut R) -> Result<u32, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).await?;
    Ok(u32::from_be_bytes(buf))
}

/// Read a length-prefixed byte string.
pub async fn read_bytes<R>(r: &mut R) -> Result<Vec<u8>, CodecError>
where
    R: AsyncRead + Unpin,
{
    let len = read_len(r).await?;
    if len > MAX_FRAME_SIZE {
        return Err(CodecError::FrameTooLarge(len));
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Read a boolean frame.
pub async fn read_bool<R>(r: &mut R) -> Result<bool, CodecError>
where
    R: AsyncRead + Unpin,
{
    let len = read_len(r).await?;
    if len != 1 {
        return Err(CodecError::BadBoolLength(len));
    }
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf).await?;
    match buf[0] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::BadBoolValue(other)),
    }
}

/// Read a length-prefixed UTF-8 string.
pub async fn read_str<R>(r: &mut R) -> Result<String, CodecError>
where
    R: AsyncRead + Unpin,
{
    let bytes = read_bytes(r).await?;
    Ok(String::from_utf8(bytes)?)
}
