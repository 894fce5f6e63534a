use super::*;
use dispatch_core::Value;

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let store = InMemoryObjectStore::new();
    let creds = Credentials::owner("owner-1");
    let err = store.get(&creds, ObjectId::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let store = InMemoryObjectStore::new();
    let creds = Credentials::owner("owner-1");
    let obj = ActionObject::new(ObjectId::new(), true, Value::primitive(1));
    store.set(&creds, &obj).await.unwrap();

    let got = store.get(&creds, obj.id).await.unwrap();
    assert_eq!(got, obj);
}

#[tokio::test]
async fn set_preserves_id_on_rewrite() {
    let store = InMemoryObjectStore::new();
    let creds = Credentials::owner("owner-1");
    let obj = ActionObject::new(ObjectId::new(), false, Value::primitive("raw"));
    store.insert(obj.clone());

    let rewritten = obj.with_data(Value::primitive("flattened"));
    store.set(&creds, &rewritten).await.unwrap();

    let got = store.get(&creds, obj.id).await.unwrap();
    assert_eq!(got.data, Value::primitive("flattened"));
    assert_eq!(got.id, obj.id);
}
