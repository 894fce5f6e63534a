// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The producer task: polls the Queue Store for CREATED and PROCESSING
//! items, runs the admission filter, and enqueues admitted requests onto the
//! in-memory Service tables for the router task to deliver.

use crate::state::{Dispatched, SharedState};
use dispatch_admission::{admit, AdmissionError, AdmissionOutcome};
use dispatch_core::{Credentials, Payload, QueueItem, QueueItemStatus};
use dispatch_storage::{ObjectStore, QueueStore, StoreError};
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
enum ProcessError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Run the producer loop until `cancel` fires. `dispatch_tx` forwards any
/// pairing that happens immediately at enqueue time (a worker already
/// waiting on the target service) to the router task for delivery.
pub async fn run(
    poll_interval: Duration,
    state: Arc<SyncMutex<SharedState>>,
    queue_store: Arc<dyn QueueStore>,
    object_store: Arc<dyn ObjectStore>,
    dispatch_tx: mpsc::Sender<Dispatched>,
    cancel: CancellationToken,
) {
    let mut tick = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                process_created(&state, queue_store.as_ref(), object_store.as_ref(), &dispatch_tx).await;
                handle_processing_tick(queue_store.as_ref()).await;
            }
        }
    }
    tracing::info!("producer task stopped");
}

async fn process_created(
    state: &Arc<SyncMutex<SharedState>>,
    queue_store: &dyn QueueStore,
    object_store: &dyn ObjectStore,
    dispatch_tx: &mpsc::Sender<Dispatched>,
) {
    let items = match queue_store.get_by_status(QueueItemStatus::Created).await {
        Ok(items) => items,
        Err(error) => {
            tracing::warn!(%error, "failed to poll CREATED queue items");
            return;
        }
    };

    for item in &items {
        if let Err(error) = process_one(state, queue_store, object_store, item, dispatch_tx).await {
            tracing::warn!(item_id = %item.id, %error, "failed to admit queue item, marking ERRORED");
            let errored = item.with_status(QueueItemStatus::Errored);
            if let Err(update_error) = queue_store.update(&item.owner_key, &errored).await {
                tracing::warn!(item_id = %item.id, error = %update_error, "failed to persist ERRORED status");
            }
        }
    }
}

async fn process_one(
    state: &Arc<SyncMutex<SharedState>>,
    queue_store: &dyn QueueStore,
    object_store: &dyn ObjectStore,
    item: &QueueItem,
    dispatch_tx: &mpsc::Sender<Dispatched>,
) -> Result<(), ProcessError> {
    let outcome = match &item.payload {
        Payload::Opaque(_) => AdmissionOutcome::Admit,
        Payload::Action(action_payload) => {
            let creds = Credentials::owner(item.owner_key.clone());
            admit(object_store, &creds, action_payload).await?
        }
    };

    let AdmissionOutcome::Admit = outcome else {
        // Left CREATED; re-evaluated on the next tick.
        return Ok(());
    };

    let bytes = serde_json::to_vec(&item.payload)?;
    let (service_known, dispatched) = state.lock().dispatch(&item.pool_name, Some(bytes));
    if !service_known {
        // No worker has ever READY'd for this pool yet; try again next tick.
        return Ok(());
    }

    let processing = item.with_status(QueueItemStatus::Processing);
    queue_store.update(&item.owner_key, &processing).await?;

    for d in dispatched {
        if dispatch_tx.send(d).await.is_err() {
            tracing::warn!("router task gone, dropping dispatch");
        }
    }
    Ok(())
}

/// Extension point for PROCESSING-status items. The broker does not
/// currently act on PROCESSING items beyond having transitioned them out of
/// CREATED; a future completion/ack protocol would poll and react here.
async fn handle_processing_tick(queue_store: &dyn QueueStore) {
    if let Err(error) = queue_store.get_by_status(QueueItemStatus::Processing).await {
        tracing::warn!(%error, "failed to poll PROCESSING queue items");
    }
}

#[cfg(test)]
#[path = "producer_tests.rs"]
mod tests;
