use super::*;

crate::define_id! {
    pub struct TestId("tst-");
}

#[test]
fn new_ids_carry_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn from_string_round_trips() {
    let id = TestId::from_string("tst-abcdefghijklmnopqrs");
    assert_eq!(id.as_str(), "tst-abcdefghijklmnopqrs");
    assert_eq!(id.suffix(), "abcdefghijklmnopqrs");
}

#[test]
fn two_generated_ids_differ() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn id_buf_borrows_as_str() {
    use std::borrow::Borrow;
    let id = TestId::from_string("tst-abcdefghijklmnopqrs");
    let s: &str = id.0.borrow();
    assert_eq!(s, "tst-abcdefghijklmnopqrs");
}
