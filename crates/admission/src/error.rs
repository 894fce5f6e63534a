// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from the admission filter that are not simple deferral.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// An unwrapped `ActionObject` leaf resolved to another `ActionObject`.
    /// The containing item is marked ERRORED by the caller.
    #[error("double nesting not supported for object {0}")]
    DoubleNesting(String),

    /// Recursion depth exceeded while walking a value tree, most likely a
    /// reference cycle between `ActionObject`s.
    #[error("recursion depth exceeded resolving object {0}")]
    RecursionLimitExceeded(String),
}
