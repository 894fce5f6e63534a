use super::*;
use crate::value::Value;

#[test]
fn with_data_preserves_id_and_resolved() {
    let obj = ActionObject::new(ObjectId::new(), true, Value::primitive(1));
    let rewritten = obj.with_data(Value::primitive(2));
    assert_eq!(rewritten.id, obj.id);
    assert_eq!(rewritten.resolved, obj.resolved);
    assert_eq!(rewritten.data, Value::primitive(2));
}

#[test]
fn object_ids_round_trip_through_json() {
    let id = ObjectId::new();
    let json = serde_json::to_string(&id).unwrap();
    let back: ObjectId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}
