// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage interfaces for the three shared resources the broker consumes:
//! the Queue Store, the Object Store, and the Worker Registry.
//!
//! Each is an `async_trait` adapter, the pattern this workspace uses at
//! every boundary to an externally-owned collaborator, with an in-memory
//! reference implementation used both for local/demo runs and directly in
//! tests throughout this workspace.

pub mod error;
pub mod object_store;
pub mod queue_store;
pub mod worker_registry;

pub use error::StoreError;
pub use object_store::{InMemoryObjectStore, ObjectStore};
pub use queue_store::{InMemoryQueueStore, QueueStore};
pub use worker_registry::{InMemoryWorkerRegistry, WorkerRecord, WorkerRegistry};
