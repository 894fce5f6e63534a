use super::*;
use dispatch_core::Payload;

fn item() -> QueueItem {
    QueueItem::new("poolA", "owner-1", Payload::Opaque(b"x".to_vec()))
}

#[tokio::test]
async fn get_by_status_returns_only_matching_items() {
    let store = InMemoryQueueStore::new();
    let created = item();
    let mut processing = item();
    processing.status = QueueItemStatus::Processing;
    store.insert(created.clone());
    store.insert(processing.clone());

    let got = store.get_by_status(QueueItemStatus::Created).await.unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].id, created.id);
}

#[tokio::test]
async fn get_by_status_preserves_insertion_order() {
    let store = InMemoryQueueStore::new();
    let a = QueueItem::new("poolA", "owner-1", Payload::Opaque(b"a".to_vec()));
    let b = QueueItem::new("poolA", "owner-1", Payload::Opaque(b"b".to_vec()));
    let c = QueueItem::new("poolA", "owner-1", Payload::Opaque(b"c".to_vec()));
    store.insert(c.clone());
    store.insert(a.clone());
    store.insert(b.clone());

    let got = store.get_by_status(QueueItemStatus::Created).await.unwrap();
    assert_eq!(got.iter().map(|i| i.id).collect::<Vec<_>>(), vec![c.id, a.id, b.id]);
}

#[tokio::test]
async fn update_rejects_wrong_owner_key() {
    let store = InMemoryQueueStore::new();
    let original = item();
    store.insert(original.clone());

    let mut updated = original.clone();
    updated.owner_key = "someone-else".into();
    let err = store.update("someone-else", &updated).await.unwrap_err();
    assert!(matches!(err, StoreError::CredentialMismatch(_)));
}

#[tokio::test]
async fn update_persists_new_status() {
    let store = InMemoryQueueStore::new();
    let original = item();
    store.insert(original.clone());

    let updated = original.with_status(QueueItemStatus::Processing);
    store.update("owner-1", &updated).await.unwrap();

    assert_eq!(store.get(original.id).unwrap().status, QueueItemStatus::Processing);
}

#[tokio::test]
async fn update_unknown_item_is_not_found() {
    let store = InMemoryQueueStore::new();
    let err = store.update("owner-1", &item()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
