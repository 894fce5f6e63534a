// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity and persisted liveness state shared between the broker
//! and the Worker Registry.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Transport-derived identity for a connected worker: the hex encoding of
/// its socket address. Unlike [`SyftWorkerId`], this is never generated;
/// it is recomputed from the peer address each time a connection is
/// accepted, so it is a plain string newtype rather than a `define_id!` type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerIdentity(pub String);

impl WorkerIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WorkerIdentity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkerIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for WorkerIdentity {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Borrow<str> for WorkerIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

crate::define_id! {
    /// Stable registry identifier for a worker, independent of its
    /// transport-level socket identity.
    pub struct SyftWorkerId("wkr-");
}

/// Persisted lifecycle value for a worker, as tracked by the Worker Registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumerState {
    Idle,
    Consuming,
    Detached,
}

crate::simple_display! {
    ConsumerState {
        Idle => "IDLE",
        Consuming => "CONSUMING",
        Detached => "DETACHED",
    }
}

/// Out-of-band flags consulted during purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerFlags {
    pub to_be_deleted: bool,
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
