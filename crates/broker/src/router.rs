// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The router task: owns the TCP listener and every worker connection, and
//! is the sole writer of worker-bound frames.
//!
//! There is no ZeroMQ ROUTER socket in this workspace's dependency stack, so
//! the address-frame prepend/strip such a socket performs automatically is
//! replaced here with a connection table keyed by [`WorkerIdentity`]: each
//! accepted TCP connection is identified by the hex encoding of its peer
//! address, and a per-connection reader task forwards parsed frames to this
//! control loop over an mpsc channel. All socket sends are still funneled
//! through one write-half registry behind a single lock.

use crate::config::BrokerConfig;
use crate::purge::purge;
use crate::state::{Dispatched, ReadyOutcome, SharedState};
use dispatch_core::{Clock, ConsumerState, SyftWorkerId, WorkerIdentity};
use dispatch_storage::WorkerRegistry;
use dispatch_wire::{read_multipart, write_multipart, BrokerFrame, WorkerFrame};
use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::WriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;

type WriteRegistry = Arc<AsyncMutex<HashMap<WorkerIdentity, WriteHalf<TcpStream>>>>;

enum RouterEvent {
    Frame { identity: WorkerIdentity, address: SocketAddr, frame: WorkerFrame },
    Disconnected { identity: WorkerIdentity },
}

/// Bind and run the router task until `cancel` fires. The caller is
/// responsible for spawning this on the runtime and joining it with a
/// timeout (see `Broker::close`).
pub async fn run<C: Clock>(
    config: BrokerConfig,
    state: Arc<SyncMutex<SharedState>>,
    registry: Arc<dyn WorkerRegistry>,
    clock: C,
    cancel: CancellationToken,
    mut dispatched_rx: mpsc::Receiver<Dispatched>,
) -> Result<(), crate::error::BrokerError> {
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(|source| crate::error::BrokerError::Bind { port: config.port, source })?;
    tracing::info!(port = config.port, queue_name = %config.queue_name, "broker router listening");

    let writers: WriteRegistry = Arc::new(AsyncMutex::new(HashMap::new()));
    let (events_tx, mut events_rx) = mpsc::channel::<RouterEvent>(1024);

    let accept_cancel = cancel.clone();
    let accept_writers = writers.clone();
    let accept_tx = events_tx.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = accept_cancel.cancelled() => break,
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, address)) => {
                            spawn_connection(stream, address, accept_writers.clone(), accept_tx.clone());
                        }
                        Err(error) => {
                            tracing::warn!(%error, "failed to accept worker connection");
                        }
                    }
                }
            }
        }
    });

    let mut heartbeat_tick = tokio::time::interval(config.heartbeat_interval);
    let mut purge_tick = tokio::time::interval(config.poller_timeout);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = heartbeat_tick.tick() => {
                let identities: Vec<WorkerIdentity> =
                    state.lock().waiting_global_oldest_first().cloned().collect();
                for identity in identities {
                    send_frame(&writers, &identity, BrokerFrame::Heartbeat).await;
                }
            }
            _ = purge_tick.tick() => {
                let outcomes = purge(&state, registry.as_ref(), clock.now()).await;
                for outcome in outcomes {
                    if outcome.send_disconnect {
                        send_frame(&writers, &outcome.identity, BrokerFrame::Disconnect).await;
                    }
                }
                // Point-wise dispatch runs on every READY/HEARTBEAT and on
                // every admitted item, but nothing guarantees those two
                // triggers interleave correctly under concurrent access to
                // `state`. Re-running dispatch against every Service on the
                // same cadence as purge is the control loop's safety net
                // against a missed pairing.
                let dispatched = state.lock().dispatch_all_idle();
                for d in dispatched {
                    send_frame(&writers, &d.identity, BrokerFrame::Request { payload: d.payload }).await;
                }
            }
            Some(event) = events_rx.recv() => {
                handle_event(event, &state, registry.as_ref(), &clock, &config, &writers).await;
            }
            Some(d) = dispatched_rx.recv() => {
                send_frame(&writers, &d.identity, BrokerFrame::Request { payload: d.payload }).await;
            }
        }
    }

    tracing::info!("router task stopped");
    Ok(())
}

fn spawn_connection(
    stream: TcpStream,
    address: SocketAddr,
    writers: WriteRegistry,
    tx: mpsc::Sender<RouterEvent>,
) {
    let identity = WorkerIdentity::new(hex_encode_addr(&address));
    tokio::spawn(async move {
        let (mut read_half, write_half) = tokio::io::split(stream);
        writers.lock().await.insert(identity.clone(), write_half);

        loop {
            match read_multipart(&mut read_half).await {
                Ok(parts) => match WorkerFrame::parse(&parts) {
                    Ok(frame) => {
                        let event = RouterEvent::Frame { identity: identity.clone(), address, frame };
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%identity, %error, "dropping malformed worker frame");
                    }
                },
                Err(_) => break,
            }
        }

        writers.lock().await.remove(&identity);
        let _ = tx.send(RouterEvent::Disconnected { identity }).await;
    });
}

fn hex_encode_addr(address: &SocketAddr) -> String {
    let ip_bytes: Vec<u8> = match address.ip() {
        std::net::IpAddr::V4(v4) => v4.octets().to_vec(),
        std::net::IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    let mut out = String::with_capacity(ip_bytes.len() * 2 + 5);
    for byte in ip_bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out.push_str(&format!(":{:04x}", address.port()));
    out
}

async fn send_frame(writers: &WriteRegistry, identity: &WorkerIdentity, frame: BrokerFrame) {
    let mut guard = writers.lock().await;
    if let Some(writer) = guard.get_mut(identity) {
        if let Err(error) = write_multipart(writer, &frame.encode()).await {
            tracing::warn!(%identity, %error, "socket send failed, dropping frame");
        }
    }
}

async fn handle_event<C: Clock>(
    event: RouterEvent,
    state: &Arc<SyncMutex<SharedState>>,
    registry: &dyn WorkerRegistry,
    clock: &C,
    config: &BrokerConfig,
    writers: &WriteRegistry,
) {
    match event {
        RouterEvent::Frame { identity, address, frame } => match frame {
            WorkerFrame::Ready { service_name, worker_id } => {
                let syft_id = SyftWorkerId::from_string(worker_id);
                let outcome = state.lock().handle_ready(identity.clone(), address, service_name.into(), syft_id);
                match outcome {
                    ReadyOutcome::Attached => {
                        attach_waiting_worker(&identity, syft_id, state, registry, clock, config, writers).await;
                        tracing::info!(%identity, "worker attached");
                    }
                    ReadyOutcome::Reregistered { .. } => {
                        send_frame(writers, &identity, BrokerFrame::Disconnect).await;
                        tracing::info!(%identity, "re-registration: disconnecting stale entry");
                    }
                }
            }
            WorkerFrame::Heartbeat => {
                let known_syft_id = state.lock().worker(&identity).map(|w| w.syft_worker_id);
                match known_syft_id {
                    Some(syft_id) => {
                        attach_waiting_worker(&identity, syft_id, state, registry, clock, config, writers).await;
                    }
                    None => {
                        tracing::warn!(%identity, "heartbeat from unknown worker, dropping");
                    }
                }
            }
            WorkerFrame::Disconnect => {
                detach_worker(&identity, state, registry).await;
                tracing::info!(%identity, "worker disconnected");
            }
        },
        RouterEvent::Disconnected { identity } => {
            detach_worker(&identity, state, registry).await;
        }
    }
}

/// Mark a worker waiting, persist IDLE, and attempt a dispatch on its
/// service: the shared tail of processing READY and HEARTBEAT frames.
async fn attach_waiting_worker<C: Clock>(
    identity: &WorkerIdentity,
    syft_id: SyftWorkerId,
    state: &Arc<SyncMutex<SharedState>>,
    registry: &dyn WorkerRegistry,
    clock: &C,
    config: &BrokerConfig,
    writers: &WriteRegistry,
) {
    let expiry = clock.now() + config.expiry_duration();
    let dispatched = {
        let mut guard = state.lock();
        match guard.mark_waiting(identity, expiry) {
            Some(service_name) => guard.dispatch(&service_name, None).1,
            None => Vec::new(),
        }
    };
    if let Err(error) = registry.update_consumer_state(syft_id, ConsumerState::Idle).await {
        tracing::warn!(%identity, %error, "failed to persist IDLE consumer state");
    }
    for d in dispatched {
        send_frame(writers, &d.identity, BrokerFrame::Request { payload: d.payload }).await;
    }
}

async fn detach_worker(identity: &WorkerIdentity, state: &Arc<SyncMutex<SharedState>>, registry: &dyn WorkerRegistry) {
    let removed = state.lock().remove_worker(identity);
    if let Some(worker) = removed {
        if let Err(error) = registry.update_consumer_state(worker.syft_worker_id, ConsumerState::Detached).await {
            tracing::warn!(%identity, %error, "failed to persist DETACHED consumer state");
        }
    }
}
