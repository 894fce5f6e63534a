// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed frame I/O.
//!
//! Wire format per frame: 4-byte length prefix (big-endian) + payload bytes.
//! A multipart message is a frame count (as its own length-prefixed frame
//! containing a 4-byte big-endian count) followed by that many frames.

use crate::error::ProtocolError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Frames above this size are rejected as malformed rather than causing an
/// unbounded allocation from a corrupt or hostile peer.
const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

/// Read one length-prefixed frame.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge { max: MAX_FRAME_LEN });
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write one length-prefixed frame.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::FrameTooLarge {
        max: MAX_FRAME_LEN,
    })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    Ok(())
}

/// Read a full multipart message: a frame count, then that many frames.
pub async fn read_multipart<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let count_frame = read_message(reader).await?;
    if count_frame.len() != 4 {
        return Err(ProtocolError::Malformed { expected: 4, actual: count_frame.len() });
    }
    let count = u32::from_be_bytes([count_frame[0], count_frame[1], count_frame[2], count_frame[3]]);
    let mut parts = Vec::with_capacity(count as usize);
    for _ in 0..count {
        parts.push(read_message(reader).await?);
    }
    Ok(parts)
}

/// Write a full multipart message: a frame count, then that many frames.
pub async fn write_multipart<W: AsyncWrite + Unpin>(
    writer: &mut W,
    parts: &[Vec<u8>],
) -> Result<(), ProtocolError> {
    let count = u32::try_from(parts.len())
        .map_err(|_| ProtocolError::FrameTooLarge { max: MAX_FRAME_LEN })?;
    write_message(writer, &count.to_be_bytes()).await?;
    for part in parts {
        write_message(writer, part).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
