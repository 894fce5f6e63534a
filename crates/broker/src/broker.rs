// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The broker: wires the shared in-memory state to the router and producer
//! tasks and owns their lifecycle.
//!
//! Exactly two tasks are spawned, matching the concurrency model: the router
//! (socket ownership, worker liveness) and the producer (queue polling,
//! admission). Both share one [`SharedState`] behind a single
//! [`parking_lot::Mutex`]; nothing else is shared mutable state.

use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::state::SharedState;
use crate::{producer, router};
use dispatch_core::Clock;
use dispatch_storage::{ObjectStore, QueueStore, WorkerRegistry};
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A running broker instance. There is no global/static broker: every caller
/// constructs and owns one explicitly, per the single-instance design note.
pub struct Broker {
    config: BrokerConfig,
    cancel: CancellationToken,
    router_handle: Option<JoinHandle<Result<(), BrokerError>>>,
    producer_handle: Option<JoinHandle<()>>,
}

impl Broker {
    /// Bind the router socket and spawn the router and producer tasks.
    pub fn start<C: Clock>(
        config: BrokerConfig,
        clock: C,
        queue_store: Arc<dyn QueueStore>,
        object_store: Arc<dyn ObjectStore>,
        worker_registry: Arc<dyn WorkerRegistry>,
    ) -> (Self, Arc<SyncMutex<SharedState>>) {
        let state = Arc::new(SyncMutex::new(SharedState::new()));
        let cancel = CancellationToken::new();
        let (dispatch_tx, dispatch_rx) = mpsc::channel(1024);

        let router_handle = tokio::spawn(router::run(
            config.clone(),
            state.clone(),
            worker_registry,
            clock,
            cancel.clone(),
            dispatch_rx,
        ));

        let producer_handle = tokio::spawn(producer::run(
            config.poller_timeout,
            state.clone(),
            queue_store,
            object_store,
            dispatch_tx,
            cancel.clone(),
        ));

        let broker = Self {
            config,
            cancel,
            router_handle: Some(router_handle),
            producer_handle: Some(producer_handle),
        };
        (broker, state)
    }

    /// Signal both tasks to stop and join them, bounded by
    /// `thread_join_timeout`.
    pub async fn close(mut self) -> Result<(), BrokerError> {
        self.cancel.cancel();

        if let Some(handle) = self.router_handle.take() {
            match tokio::time::timeout(self.config.thread_join_timeout, handle).await {
                Ok(Ok(result)) => result?,
                Ok(Err(_)) => tracing::warn!("router task panicked"),
                Err(_) => return Err(BrokerError::RouterJoinTimeout),
            }
        }

        if let Some(handle) = self.producer_handle.take() {
            match tokio::time::timeout(self.config.thread_join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => tracing::warn!("producer task panicked"),
                Err(_) => return Err(BrokerError::ProducerJoinTimeout),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
