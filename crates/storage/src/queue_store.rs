// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue Store (component A): persistent mapping of item-id to `QueueItem`.

use crate::error::StoreError;
use async_trait::async_trait;
use dispatch_core::{QueueItem, QueueItemId, QueueItemStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Operations the core calls on the Queue Store. No other operation is
/// called from the core; failures are logged by the caller and the producer
/// loop continues.
#[async_trait]
pub trait QueueStore: Send + Sync + 'static {
    /// A snapshot of items in the given status, oldest insertion first.
    async fn get_by_status(&self, status: QueueItemStatus) -> Result<Vec<QueueItem>, StoreError>;

    /// Persist the item's new status/fields, authenticated by `owner_key`.
    async fn update(&self, owner_key: &str, item: &QueueItem) -> Result<(), StoreError>;
}

#[derive(Default)]
struct State {
    items: HashMap<QueueItemId, QueueItem>,
    // Insertion order, kept separately since `HashMap` iteration order is
    // unrelated to it and `get_by_status` must return items FIFO per
    // service.
    order: Vec<QueueItemId>,
}

/// In-memory reference Queue Store, suitable for local runs and tests.
#[derive(Clone, Default)]
pub struct InMemoryQueueStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an item directly, bypassing credential checks. Used by the CLI's
    /// `push` command and by test setup.
    pub fn insert(&self, item: QueueItem) {
        let mut state = self.state.lock();
        if !state.items.contains_key(&item.id) {
            state.order.push(item.id);
        }
        state.items.insert(item.id, item);
    }

    pub fn get(&self, id: QueueItemId) -> Option<QueueItem> {
        self.state.lock().items.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn get_by_status(&self, status: QueueItemStatus) -> Result<Vec<QueueItem>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.items.get(id))
            .filter(|i| i.status == status)
            .cloned()
            .collect())
    }

    async fn update(&self, owner_key: &str, item: &QueueItem) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let existing = state
            .items
            .get(&item.id)
            .ok_or_else(|| StoreError::NotFound(item.id.to_string()))?;
        if existing.owner_key.as_str() != owner_key {
            return Err(StoreError::CredentialMismatch(item.id.to_string()));
        }
        state.items.insert(item.id, item.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_store_tests.rs"]
mod tests;
