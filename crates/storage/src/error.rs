// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors returned by the Queue Store, Object Store, and Worker Registry.
///
/// Every variant here is a "transient store error": callers log and skip
/// the operation rather than retrying inline or propagating a panic.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("credential mismatch for {0}")]
    CredentialMismatch(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}
