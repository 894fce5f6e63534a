// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by frame codec and message parsing.
///
/// [`ProtocolError::UnknownCommand`], [`ProtocolError::UnknownHeader`], and
/// [`ProtocolError::Malformed`] are protocol violations: callers log and
/// drop the frame rather than propagate. [`ProtocolError::Io`] and
/// [`ProtocolError::Timeout`] indicate a local or transport failure and are
/// propagated to the caller.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out waiting for frame")]
    Timeout,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("frame too short: expected at least {expected} parts, got {actual}")]
    Malformed { expected: usize, actual: usize },

    #[error("unknown header byte: {0:#x}")]
    UnknownHeader(u8),

    #[error("unknown command byte: {0:#x}")]
    UnknownCommand(u8),

    #[error("frame exceeds maximum length {max} bytes")]
    FrameTooLarge { max: u32 },
}
