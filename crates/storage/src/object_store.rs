// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object Store (component B): mapping of object-id to `ActionObject`.

use crate::error::StoreError;
use async_trait::async_trait;
use dispatch_core::{ActionObject, Credentials, ObjectId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    async fn get(&self, credentials: &Credentials, id: ObjectId) -> Result<ActionObject, StoreError>;

    /// Used by the admission filter to persist flattened rewrites.
    async fn set(&self, credentials: &Credentials, object: &ActionObject) -> Result<(), StoreError>;
}

#[derive(Default)]
struct State {
    objects: HashMap<ObjectId, ActionObject>,
}

/// In-memory reference Object Store. Credential verification is a no-op
/// here, since access control happens at the store layer in a production
/// backend; this reference store does not implement authentication.
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, object: ActionObject) {
        self.state.lock().objects.insert(object.id, object);
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, _credentials: &Credentials, id: ObjectId) -> Result<ActionObject, StoreError> {
        self.state.lock().objects.get(&id).cloned().ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn set(&self, _credentials: &Credentials, object: &ActionObject) -> Result<(), StoreError> {
        self.state.lock().objects.insert(object.id, object.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "object_store_tests.rs"]
mod tests;
