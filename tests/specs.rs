//! End-to-end scenarios run against a real broker bound to a loopback TCP
//! port, driven by hand-written fake workers speaking the wire protocol
//! directly. Each test is independent and uses its own port.

use dispatch_broker::{Broker, BrokerConfig};
use dispatch_core::{
    ActionObject, ActionPayload, ObjectId, Payload, QueueItem, QueueItemStatus, SystemClock, Value,
};
use dispatch_storage::{InMemoryObjectStore, InMemoryQueueStore, InMemoryWorkerRegistry};
use dispatch_wire::{read_multipart, write_multipart, BrokerFrame, WorkerFrame};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

async fn connect_with_retry(port: u16) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("broker never started accepting connections on port {port}");
}

async fn send_ready(stream: &mut TcpStream, pool: &str, worker_id: &str) {
    write_multipart(
        stream,
        &WorkerFrame::Ready { service_name: pool.into(), worker_id: worker_id.into() }.encode(),
    )
    .await
    .unwrap();
}

async fn send_heartbeat(stream: &mut TcpStream) {
    write_multipart(stream, &WorkerFrame::Heartbeat.encode()).await.unwrap();
}

async fn recv_broker_frame(stream: &mut TcpStream, within: Duration) -> Option<BrokerFrame> {
    match timeout(within, read_multipart(stream)).await {
        Ok(Ok(parts)) => Some(BrokerFrame::parse(&parts).unwrap()),
        Ok(Err(_)) => None,
        Err(_) => None,
    }
}

/// Read frames until one matches `predicate` or `within` elapses, discarding
/// any that don't match (used to skip past the broker's periodic liveness
/// heartbeats while waiting for a specific frame).
async fn recv_until(
    stream: &mut TcpStream,
    within: Duration,
    predicate: impl Fn(&BrokerFrame) -> bool,
) -> Option<BrokerFrame> {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return None;
        }
        match timeout(remaining, read_multipart(stream)).await {
            Ok(Ok(parts)) => {
                let frame = BrokerFrame::parse(&parts).unwrap();
                if predicate(&frame) {
                    return Some(frame);
                }
            }
            _ => return None,
        }
    }
}

fn fast_config(port: u16) -> BrokerConfig {
    BrokerConfig {
        port,
        poller_timeout: Duration::from_millis(20),
        heartbeat_interval: Duration::from_millis(500),
        heartbeat_liveness: 3,
        thread_join_timeout: Duration::from_secs(5),
        ..BrokerConfig::default()
    }
}

/// S1: happy path. A registered idle worker receives a freshly admitted
/// item, and the Queue Store reflects the transition to PROCESSING.
#[tokio::test]
async fn s1_happy_path() {
    let config = fast_config(58_501);
    let queue_store = Arc::new(InMemoryQueueStore::new());
    let object_store = Arc::new(InMemoryObjectStore::new());
    let worker_registry = Arc::new(InMemoryWorkerRegistry::new());
    let (broker, _state) =
        Broker::start(config.clone(), SystemClock, queue_store.clone(), object_store, worker_registry);

    let mut worker = connect_with_retry(config.port).await;
    send_ready(&mut worker, "poolA", "w1").await;

    let item = QueueItem::new("poolA", "owner-1", Payload::Opaque(b"hello".to_vec()));
    queue_store.insert(item.clone());

    let frame = recv_until(&mut worker, Duration::from_secs(2), |f| matches!(f, BrokerFrame::Request { .. }))
        .await
        .expect("expected a dispatch");
    match frame {
        BrokerFrame::Request { payload } => {
            let decoded: Payload = serde_json::from_slice(&payload).unwrap();
            assert_eq!(decoded, Payload::Opaque(b"hello".to_vec()));
        }
        other => panic!("expected Request, got {other:?}"),
    }
    assert_eq!(queue_store.get(item.id).unwrap().status, QueueItemStatus::Processing);

    broker.close().await.unwrap();
}

/// S2: deferral. An item referencing an unresolved object stays CREATED
/// across several producer ticks, then admits once the object resolves.
#[tokio::test]
async fn s2_deferral_then_resolution() {
    let config = fast_config(58_502);
    let queue_store = Arc::new(InMemoryQueueStore::new());
    let object_store = Arc::new(InMemoryObjectStore::new());
    let worker_registry = Arc::new(InMemoryWorkerRegistry::new());
    let (broker, _state) = Broker::start(
        config.clone(),
        SystemClock,
        queue_store.clone(),
        object_store.clone(),
        worker_registry,
    );

    let mut worker = connect_with_retry(config.port).await;
    send_ready(&mut worker, "poolA", "w1").await;

    let object_id = ObjectId::new();
    object_store.insert(ActionObject::new(object_id, false, Value::primitive(serde_json::json!(null))));

    let payload = ActionPayload::new("do-thing").with_args(vec![object_id]);
    let item = QueueItem::new("poolA", "owner-1", Payload::Action(payload));
    queue_store.insert(item.clone());

    // Several producer ticks pass with no resolution: still CREATED, no frame.
    tokio::time::sleep(config.poller_timeout * 4).await;
    assert_eq!(queue_store.get(item.id).unwrap().status, QueueItemStatus::Created);
    assert!(recv_broker_frame(&mut worker, Duration::from_millis(50)).await.is_none());

    object_store.insert(ActionObject::new(object_id, true, Value::primitive(serde_json::json!(42))));

    let frame = recv_until(&mut worker, Duration::from_secs(2), |f| matches!(f, BrokerFrame::Request { .. }))
        .await
        .expect("expected a dispatch");
    assert!(matches!(frame, BrokerFrame::Request { .. }));
    assert_eq!(queue_store.get(item.id).unwrap().status, QueueItemStatus::Processing);

    broker.close().await.unwrap();
}

/// S3: worker death. A registered, idle worker that stops heartbeating is
/// purged after `liveness * interval`, with DISCONNECT sent and DETACHED
/// persisted.
#[tokio::test]
async fn s3_worker_death_triggers_purge() {
    let config = BrokerConfig {
        port: 58_503,
        poller_timeout: Duration::from_millis(15),
        heartbeat_interval: Duration::from_millis(30),
        heartbeat_liveness: 2,
        thread_join_timeout: Duration::from_secs(5),
        ..BrokerConfig::default()
    };
    let queue_store = Arc::new(InMemoryQueueStore::new());
    let object_store = Arc::new(InMemoryObjectStore::new());
    let worker_registry = Arc::new(InMemoryWorkerRegistry::new());
    let (broker, _state) =
        Broker::start(config.clone(), SystemClock, queue_store, object_store, worker_registry.clone());

    let mut worker = connect_with_retry(config.port).await;
    send_ready(&mut worker, "poolA", "w1").await;

    // Never heartbeat again; expiry = 60ms. The broker's own liveness
    // heartbeats (every 30ms) will arrive first; skip past those.
    let frame = recv_until(&mut worker, Duration::from_secs(2), |f| *f == BrokerFrame::Disconnect)
        .await
        .expect("expected DISCONNECT");
    assert_eq!(frame, BrokerFrame::Disconnect);

    let syft_id = dispatch_core::SyftWorkerId::from_string("w1");
    let record = worker_registry.get_by_id(syft_id).await.unwrap().expect("worker record should exist");
    assert_eq!(record.consumer_state, dispatch_core::ConsumerState::Detached);

    broker.close().await.unwrap();
}

/// S4: re-registration. A second READY from the same connection gets
/// DISCONNECT, and the stale entry is dropped rather than re-added.
#[tokio::test]
async fn s4_reregistration_disconnects_stale_entry() {
    let config = fast_config(58_504);
    let queue_store = Arc::new(InMemoryQueueStore::new());
    let object_store = Arc::new(InMemoryObjectStore::new());
    let worker_registry = Arc::new(InMemoryWorkerRegistry::new());
    let (broker, state) =
        Broker::start(config.clone(), SystemClock, queue_store, object_store, worker_registry);

    let mut worker = connect_with_retry(config.port).await;
    send_ready(&mut worker, "poolA", "w1").await;
    // Give the router a moment to process the first READY.
    tokio::time::sleep(Duration::from_millis(100)).await;

    send_ready(&mut worker, "poolA", "w1").await;

    let frame = recv_until(&mut worker, Duration::from_secs(2), |f| *f == BrokerFrame::Disconnect)
        .await
        .expect("expected DISCONNECT");
    assert_eq!(frame, BrokerFrame::Disconnect);

    // The stale entry was dropped, not re-added; nothing is waiting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(state.lock().waiting_global_oldest_first().count(), 0);

    broker.close().await.unwrap();
}

/// S5: double nesting. An item referencing a doubly-nested object is
/// rejected by admission and marked ERRORED with no frame ever sent.
#[tokio::test]
async fn s5_double_nesting_marks_errored() {
    let config = fast_config(58_505);
    let queue_store = Arc::new(InMemoryQueueStore::new());
    let object_store = Arc::new(InMemoryObjectStore::new());
    let worker_registry = Arc::new(InMemoryWorkerRegistry::new());
    let (broker, _state) = Broker::start(
        config.clone(),
        SystemClock,
        queue_store.clone(),
        object_store.clone(),
        worker_registry,
    );

    let mut worker = connect_with_retry(config.port).await;
    send_ready(&mut worker, "poolA", "w1").await;

    let inner_id = ObjectId::new();
    let outer_id = ObjectId::new();
    let top_id = ObjectId::new();
    object_store.insert(ActionObject::new(inner_id, true, Value::primitive(serde_json::json!(1))));
    object_store.insert(ActionObject::new(outer_id, true, Value::object_ref(inner_id)));
    object_store.insert(ActionObject::new(top_id, true, Value::object_ref(outer_id)));

    let payload = ActionPayload::new("do-thing").with_args(vec![top_id]);
    let item = QueueItem::new("poolA", "owner-1", Payload::Action(payload));
    queue_store.insert(item.clone());

    tokio::time::sleep(config.poller_timeout * 4).await;
    assert_eq!(queue_store.get(item.id).unwrap().status, QueueItemStatus::Errored);
    assert!(recv_broker_frame(&mut worker, Duration::from_millis(50)).await.is_none());

    broker.close().await.unwrap();
}

/// S6: ordering. Three admissible items queued for one worker are
/// delivered in FIFO order, one per heartbeat-driven return to waiting.
#[tokio::test]
async fn s6_fifo_ordering_across_items() {
    let config = fast_config(58_506);
    let queue_store = Arc::new(InMemoryQueueStore::new());
    let object_store = Arc::new(InMemoryObjectStore::new());
    let worker_registry = Arc::new(InMemoryWorkerRegistry::new());
    let (broker, _state) =
        Broker::start(config.clone(), SystemClock, queue_store.clone(), object_store, worker_registry);

    let mut worker = connect_with_retry(config.port).await;
    send_ready(&mut worker, "poolA", "w1").await;

    for label in ["a", "b", "c"] {
        let item = QueueItem::new("poolA", "owner-1", Payload::Opaque(label.as_bytes().to_vec()));
        queue_store.insert(item);
    }

    let mut received = Vec::new();
    for _ in 0..3 {
        let frame = recv_until(&mut worker, Duration::from_secs(2), |f| matches!(f, BrokerFrame::Request { .. }))
            .await
            .expect("expected a dispatch");
        match frame {
            BrokerFrame::Request { payload } => {
                let decoded: Payload = serde_json::from_slice(&payload).unwrap();
                match decoded {
                    Payload::Opaque(bytes) => received.push(String::from_utf8(bytes).unwrap()),
                    other => panic!("expected Opaque payload, got {other:?}"),
                }
            }
            other => panic!("expected Request, got {other:?}"),
        }
        send_heartbeat(&mut worker).await;
    }

    assert_eq!(received, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    broker.close().await.unwrap();
}
