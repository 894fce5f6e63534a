// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker Registry (component C): persisted mapping of worker-id to
//! liveness/consumer-state.

use crate::error::StoreError;
use async_trait::async_trait;
use dispatch_core::{ConsumerState, SyftWorkerId, WorkerFlags};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Persisted record for one worker, as tracked by the Worker Registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRecord {
    pub id: SyftWorkerId,
    pub consumer_state: ConsumerState,
    pub flags: WorkerFlags,
}

#[async_trait]
pub trait WorkerRegistry: Send + Sync + 'static {
    async fn get_by_id(&self, id: SyftWorkerId) -> Result<Option<WorkerRecord>, StoreError>;

    /// Called on each state transition of the corresponding in-memory
    /// Worker. Errors are logged by the caller; they never block the broker
    /// loop.
    async fn update_consumer_state(
        &self,
        id: SyftWorkerId,
        state: ConsumerState,
    ) -> Result<(), StoreError>;

    /// Consulted during purge.
    async fn get_flags(&self, id: SyftWorkerId) -> Result<WorkerFlags, StoreError>;
}

#[derive(Default)]
struct State {
    records: HashMap<SyftWorkerId, WorkerRecord>,
}

/// In-memory reference Worker Registry.
#[derive(Clone, Default)]
pub struct InMemoryWorkerRegistry {
    state: Arc<Mutex<State>>,
}

impl InMemoryWorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker with default (not-deleted, idle) state. Called by
    /// the broker's router task the first time it assigns a `syft_worker_id`
    /// to a freshly-attached worker.
    pub fn register(&self, id: SyftWorkerId) {
        self.state.lock().records.entry(id).or_insert(WorkerRecord {
            id,
            consumer_state: ConsumerState::Idle,
            flags: WorkerFlags::default(),
        });
    }

    /// Mark a worker for teardown out-of-band, as an external operator or
    /// health check might. Consulted by the broker's purge pass.
    pub fn flag_to_be_deleted(&self, id: SyftWorkerId) {
        if let Some(record) = self.state.lock().records.get_mut(&id) {
            record.flags.to_be_deleted = true;
        }
    }
}

#[async_trait]
impl WorkerRegistry for InMemoryWorkerRegistry {
    async fn get_by_id(&self, id: SyftWorkerId) -> Result<Option<WorkerRecord>, StoreError> {
        Ok(self.state.lock().records.get(&id).cloned())
    }

    async fn update_consumer_state(
        &self,
        id: SyftWorkerId,
        state: ConsumerState,
    ) -> Result<(), StoreError> {
        let mut guard = self.state.lock();
        let record = guard.records.entry(id).or_insert(WorkerRecord {
            id,
            consumer_state: state,
            flags: WorkerFlags::default(),
        });
        record.consumer_state = state;
        Ok(())
    }

    async fn get_flags(&self, id: SyftWorkerId) -> Result<WorkerFlags, StoreError> {
        Ok(self.state.lock().records.get(&id).map(|r| r.flags).unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "worker_registry_tests.rs"]
mod tests;
