// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action objects: the units the admission filter dereferences and flattens.

use crate::value::Value;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for an [`ActionObject`] stored in the Object Store.
    pub struct ObjectId("obj-");
}

/// A stored value with a resolved flag; may contain nested references to
/// other `ActionObject`s by id, or collections whose elements are
/// `ActionObject`s.
///
/// Lifecycle is managed externally (component B); the admission filter only
/// reads objects and, on a successful rewrite, replaces `data` with the
/// flattened form while keeping `id` stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionObject {
    pub id: ObjectId,
    pub resolved: bool,
    pub data: Value,
}

impl ActionObject {
    pub fn new(id: ObjectId, resolved: bool, data: Value) -> Self {
        Self { id, resolved, data }
    }

    /// Returns a copy of this object with `data` replaced, `id` unchanged.
    pub fn with_data(&self, data: Value) -> Self {
        Self { id: self.id, resolved: self.resolved, data }
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
