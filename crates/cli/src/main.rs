// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dispatchd` - operator entry point for the job dispatch broker.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dispatch_broker::{Broker, BrokerConfig};
use dispatch_core::{Payload, QueueItem, SystemClock};
use dispatch_storage::{InMemoryObjectStore, InMemoryQueueStore, InMemoryWorkerRegistry};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dispatchd", about = "Job dispatch broker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the broker in the foreground against the in-memory reference
    /// stores, until interrupted.
    Serve {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        queue_name: Option<String>,
        #[arg(long)]
        heartbeat_interval_sec: Option<f64>,
        #[arg(long)]
        heartbeat_liveness: Option<u32>,
    },
    /// Seed a CREATED queue item into a fresh in-memory Queue Store and
    /// print it as JSON. A local smoke-testing affordance, not a client for
    /// a running `serve` process.
    Push {
        #[arg(long)]
        pool: String,
        #[arg(long)]
        owner_key: String,
        /// Raw payload bytes, taken verbatim from the argument's UTF-8 bytes.
        #[arg(long)]
        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port, queue_name, heartbeat_interval_sec, heartbeat_liveness } => {
            serve(port, queue_name, heartbeat_interval_sec, heartbeat_liveness).await
        }
        Command::Push { pool, owner_key, payload } => push(pool, owner_key, payload),
    }
}

async fn serve(
    port: Option<u16>,
    queue_name: Option<String>,
    heartbeat_interval_sec: Option<f64>,
    heartbeat_liveness: Option<u32>,
) -> Result<()> {
    let mut config = BrokerConfig::from_env();
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(queue_name) = queue_name {
        config.queue_name = queue_name.into();
    }
    if let Some(secs) = heartbeat_interval_sec {
        config.heartbeat_interval = std::time::Duration::from_secs_f64(secs);
    }
    if let Some(liveness) = heartbeat_liveness {
        config.heartbeat_liveness = liveness;
    }

    let queue_store = Arc::new(InMemoryQueueStore::new());
    let object_store = Arc::new(InMemoryObjectStore::new());
    let worker_registry = Arc::new(InMemoryWorkerRegistry::new());

    tracing::info!(port = config.port, "starting dispatchd");
    let (broker, _state) =
        Broker::start(config, SystemClock, queue_store, object_store, worker_registry);

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    tracing::info!("shutting down");
    broker.close().await.context("broker shutdown failed")?;
    Ok(())
}

fn push(pool: String, owner_key: String, payload: String) -> Result<()> {
    let store = InMemoryQueueStore::new();
    let item = QueueItem::new(pool, owner_key, Payload::Opaque(payload.into_bytes()));
    store.insert(item.clone());
    let json = serde_json::to_string_pretty(&item).context("failed to serialize queue item")?;
    println!("{json}");
    Ok(())
}
