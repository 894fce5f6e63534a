// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Purge pass: for every worker in the global waiting list (oldest first),
//! consult the Worker Registry's flags and remove workers that are expired
//! or flagged `to_be_deleted`.

use crate::state::SharedState;
use dispatch_core::{ConsumerState, WorkerIdentity};
use dispatch_storage::WorkerRegistry;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::time::Instant;

/// A worker removed by this purge pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeOutcome {
    pub identity: WorkerIdentity,
    pub address: SocketAddr,
    /// True if removed for expiry (a DISCONNECT frame should be sent);
    /// false if removed only because of the registry's `to_be_deleted` flag.
    pub send_disconnect: bool,
}

/// Run one purge pass against the current waiting list.
///
/// If the registry lookup for a worker fails, that worker is skipped this
/// tick: it is not removed and will be re-considered on the next purge.
pub async fn purge(
    state: &Mutex<SharedState>,
    registry: &dyn WorkerRegistry,
    now: Instant,
) -> Vec<PurgeOutcome> {
    let candidates: Vec<(WorkerIdentity, SocketAddr, Instant, _)> = {
        let guard = state.lock();
        guard
            .waiting_global_oldest_first()
            .filter_map(|id| guard.worker(id).map(|w| (id.clone(), w.address, w.expiry_deadline, w.syft_worker_id)))
            .collect()
    };

    let mut outcomes = Vec::new();
    for (identity, address, expiry_deadline, syft_worker_id) in candidates {
        let flags = match registry.get_flags(syft_worker_id).await {
            Ok(flags) => flags,
            Err(error) => {
                tracing::warn!(%identity, %error, "worker registry lookup failed during purge, skipping");
                continue;
            }
        };
        let expired = now >= expiry_deadline;
        if !expired && !flags.to_be_deleted {
            continue;
        }

        state.lock().remove_worker(&identity);
        if let Err(error) = registry.update_consumer_state(syft_worker_id, ConsumerState::Detached).await {
            tracing::warn!(%identity, %error, "failed to persist DETACHED consumer state");
        }
        tracing::info!(%identity, expired, to_be_deleted = flags.to_be_deleted, "worker torn down by purge");
        outcomes.push(PurgeOutcome { identity, address, send_disconnect: expired });
    }
    outcomes
}

#[cfg(test)]
#[path = "purge_tests.rs"]
mod tests;
