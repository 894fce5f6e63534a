// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue items: externally-submitted units of work held in the Queue Store.

use crate::object::ObjectId;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;

crate::define_id! {
    /// Identifier for a [`QueueItem`] in the Queue Store.
    pub struct QueueItemId("qit-");
}

/// Lifecycle status of a [`QueueItem`].
///
/// Monotonic: CREATED → PROCESSING → (ERRORED | COMPLETED). The broker never
/// produces a backward transition; COMPLETED is written by external writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueItemStatus {
    Created,
    Processing,
    Errored,
    Completed,
}

crate::simple_display! {
    QueueItemStatus {
        Created => "CREATED",
        Processing => "PROCESSING",
        Errored => "ERRORED",
        Completed => "COMPLETED",
    }
}

/// The structured interpretation of a `QueueItem`'s payload: an action id
/// with positional and keyword argument references into the Object Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub action_id: SmolStr,
    pub args: Vec<ObjectId>,
    pub kwargs: BTreeMap<SmolStr, ObjectId>,
}

impl ActionPayload {
    pub fn new(action_id: impl Into<SmolStr>) -> Self {
        Self { action_id: action_id.into(), args: Vec::new(), kwargs: BTreeMap::new() }
    }

    pub fn with_args(mut self, args: Vec<ObjectId>) -> Self {
        self.args = args;
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<SmolStr>, value: ObjectId) -> Self {
        self.kwargs.insert(key.into(), value);
        self
    }

    /// All object ids referenced by this payload, args then kwargs in key order.
    pub fn referenced_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.args.iter().copied().chain(self.kwargs.values().copied())
    }
}

/// Either an opaque serialized payload or a structured [`ActionPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Opaque(Vec<u8>),
    Action(ActionPayload),
}

/// A persisted unit of work, as held by the Queue Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    /// Opaque bytes used as the credential presented back to the Queue
    /// Store on `update`.
    pub owner_key: SmolStr,
    /// Name of the target Service (worker pool).
    pub pool_name: SmolStr,
    pub status: QueueItemStatus,
    pub payload: Payload,
}

impl QueueItem {
    pub fn new(pool_name: impl Into<SmolStr>, owner_key: impl Into<SmolStr>, payload: Payload) -> Self {
        Self {
            id: QueueItemId::new(),
            owner_key: owner_key.into(),
            pool_name: pool_name.into(),
            status: QueueItemStatus::Created,
            payload,
        }
    }

    /// The structured payload, if this item carries one.
    pub fn action_payload(&self) -> Option<&ActionPayload> {
        match &self.payload {
            Payload::Action(p) => Some(p),
            Payload::Opaque(_) => None,
        }
    }

    pub fn with_status(&self, status: QueueItemStatus) -> Self {
        Self { status, ..self.clone() }
    }
}

#[cfg(test)]
#[path = "queue_item_tests.rs"]
mod tests;
