// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from the broker's own lifecycle operations.
///
/// Errors from the per-item or per-frame hot paths never escape the
/// broker's tasks (they're logged and the loop continues); this type
/// covers only bind/join failures at `start()`/`close()`.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("failed to bind to port {port}: {source}")]
    Bind { port: u16, #[source] source: std::io::Error },

    #[error("router task did not join within the configured timeout")]
    RouterJoinTimeout,

    #[error("producer task did not join within the configured timeout")]
    ProducerJoinTimeout,
}
