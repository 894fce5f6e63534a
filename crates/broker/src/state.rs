// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory Worker Table, Service Table, and the global waiting list.
//!
//! Workers and Services are an arena-plus-index model: the Broker owns two
//! tables (workers by identity, services by name) and every cross-reference,
//! a Worker's Service, a Service's waiting workers, is a key, not a
//! pointer. Purging a Worker is a key removal from up to three collections.
//! This module is deliberately free of I/O so the dispatch, purge, and
//! waiting invariants can be exercised without a socket.

use dispatch_core::{SyftWorkerId, WorkerIdentity};
use smol_str::SmolStr;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::Instant;

/// One connected worker, keyed by [`WorkerIdentity`] in [`SharedState::workers`].
#[derive(Debug, Clone)]
pub struct Worker {
    pub identity: WorkerIdentity,
    pub address: SocketAddr,
    /// The Service this worker is attached to, or `None` before its first
    /// READY is processed.
    pub service: Option<SmolStr>,
    pub syft_worker_id: SyftWorkerId,
    pub expiry_deadline: Instant,
}

/// An in-memory registry for one named worker pool.
#[derive(Debug, Default)]
pub struct Service {
    pub name: SmolStr,
    /// FIFO byte-frame queue of requests not yet handed to a worker.
    pub requests: VecDeque<Vec<u8>>,
    /// FIFO of idle workers attached to this service.
    pub waiting: VecDeque<WorkerIdentity>,
}

impl Service {
    fn new(name: SmolStr) -> Self {
        Self { name, requests: VecDeque::new(), waiting: VecDeque::new() }
    }
}

/// Outcome of processing a READY frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// A fresh worker was attached to the named service.
    Attached,
    /// The identity was already known; the prior entry was removed and this
    /// frame was dropped. The caller must send DISCONNECT to `address` and
    /// wait for the worker to resend READY.
    Reregistered { previous_address: SocketAddr },
}

/// A pairing produced by [`SharedState::dispatch`]: send `payload` to the
/// worker at `identity`.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub identity: WorkerIdentity,
    pub payload: Vec<u8>,
}

/// The Worker Table, Service Table, and global waiting list, guarded
/// together by a single lock per the concurrency model: Service.requests,
/// Service.waiting, the worker table, and waiting-global are accessed from
/// both the router task and the producer task and must be serialized as one
/// unit.
#[derive(Debug, Default)]
pub struct SharedState {
    workers: HashMap<WorkerIdentity, Worker>,
    services: HashMap<SmolStr, Service>,
    waiting_global: VecDeque<WorkerIdentity>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a READY frame. Creates the named Service if absent.
    pub fn handle_ready(
        &mut self,
        identity: WorkerIdentity,
        address: SocketAddr,
        service_name: SmolStr,
        syft_worker_id: SyftWorkerId,
    ) -> ReadyOutcome {
        if let Some(existing) = self.workers.get(&identity) {
            let previous_address = existing.address;
            self.remove_worker(&identity);
            return ReadyOutcome::Reregistered { previous_address };
        }
        self.services.entry(service_name.clone()).or_insert_with(|| Service::new(service_name.clone()));
        self.workers.insert(
            identity.clone(),
            Worker {
                identity,
                address,
                service: Some(service_name),
                syft_worker_id,
                // Set on the following `mark_waiting` call; placeholder
                // until then so the table always holds a complete record.
                expiry_deadline: Instant::now(),
            },
        );
        ReadyOutcome::Attached
    }

    /// Mark a worker waiting: append to the global waiting list (if absent)
    /// and its Service's waiting list (if absent), reset its expiry
    /// deadline. Returns the worker's service name so the caller can attempt
    /// a dispatch, or `None` if the identity is unknown.
    pub fn mark_waiting(&mut self, identity: &WorkerIdentity, expiry_deadline: Instant) -> Option<SmolStr> {
        let worker = self.workers.get_mut(identity)?;
        worker.expiry_deadline = expiry_deadline;
        let service_name = worker.service.clone()?;

        if !self.waiting_global.contains(identity) {
            self.waiting_global.push_back(identity.clone());
        }
        if let Some(service) = self.services.get_mut(&service_name) {
            if !service.waiting.contains(identity) {
                service.waiting.push_back(identity.clone());
            }
        }
        Some(service_name)
    }

    /// Remove a worker from its Service's waiting list, the global waiting
    /// list, and the Worker Table. Idempotent on an unknown identity.
    pub fn remove_worker(&mut self, identity: &WorkerIdentity) -> Option<Worker> {
        let worker = self.workers.remove(identity)?;
        self.waiting_global.retain(|w| w != identity);
        if let Some(service_name) = &worker.service {
            if let Some(service) = self.services.get_mut(service_name) {
                service.waiting.retain(|w| w != identity);
            }
        }
        Some(worker)
    }

    pub fn worker(&self, identity: &WorkerIdentity) -> Option<&Worker> {
        self.workers.get(identity)
    }

    /// Append `payload` (if any) to a Service's request buffer, then pair
    /// waiting workers with queued requests FIFO until one side is empty.
    /// Returns `false` without appending if `payload` was given but the
    /// named Service does not exist yet (the producer loop's "service not
    /// registered" skip case).
    pub fn dispatch(&mut self, service_name: &str, payload: Option<Vec<u8>>) -> (bool, Vec<Dispatched>) {
        let Some(service) = self.services.get_mut(service_name) else {
            return (false, Vec::new());
        };
        if let Some(payload) = payload {
            service.requests.push_back(payload);
        }

        let mut dispatched = Vec::new();
        while !service.waiting.is_empty() && !service.requests.is_empty() {
            let identity = service.waiting.pop_front().expect("checked non-empty above");
            let payload = service.requests.pop_front().expect("checked non-empty above");
            self.waiting_global.retain(|w| w != &identity);
            dispatched.push(Dispatched { identity, payload });
        }
        (true, dispatched)
    }

    /// Attempt a dispatch against every known Service with no new message:
    /// the router loop's "drain requests against already-waiting workers"
    /// step.
    pub fn dispatch_all_idle(&mut self) -> Vec<Dispatched> {
        let names: Vec<SmolStr> = self.services.keys().cloned().collect();
        let mut out = Vec::new();
        for name in names {
            let (_, mut d) = self.dispatch(&name, None);
            out.append(&mut d);
        }
        out
    }

    /// Workers in the global waiting list, oldest first, for heartbeat
    /// broadcast and purge.
    pub fn waiting_global_oldest_first(&self) -> impl Iterator<Item = &WorkerIdentity> {
        self.waiting_global.iter()
    }

    /// Invariant check (testable property 1): every Service's waiting list
    /// is a subset of the global waiting list.
    #[cfg(test)]
    pub fn waiting_invariant_holds(&self) -> bool {
        self.services.values().all(|service| {
            service.waiting.iter().all(|w| self.waiting_global.contains(w))
        })
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
