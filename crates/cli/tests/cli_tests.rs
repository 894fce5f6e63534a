use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn push_prints_a_created_queue_item_as_json() {
    Command::cargo_bin("dispatchd")
        .unwrap()
        .args(["push", "--pool", "poolA", "--owner-key", "owner-1", "--payload", "hello"])
        .assert()
        .success()
        .stdout(contains("\"status\": \"CREATED\""))
        .stdout(contains("\"pool_name\": \"poolA\""));
}

#[test]
fn push_requires_pool_argument() {
    Command::cargo_bin("dispatchd")
        .unwrap()
        .args(["push", "--owner-key", "owner-1", "--payload", "hello"])
        .assert()
        .failure();
}
