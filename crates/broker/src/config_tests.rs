use super::*;
use serial_test::serial;

#[test]
fn defaults_match_external_contract() {
    let config = BrokerConfig::default();
    assert_eq!(config.heartbeat_interval, Duration::from_millis(2_500));
    assert_eq!(config.heartbeat_liveness, 3);
    assert_eq!(config.poller_timeout, Duration::from_millis(250));
    assert_eq!(config.thread_join_timeout, Duration::from_secs(5));
}

#[yare::parameterized(
    default = { Duration::from_millis(2_500), 3, Duration::from_millis(7_500) },
    one_shot = { Duration::from_secs(1), 1, Duration::from_secs(1) },
    zero_liveness = { Duration::from_secs(1), 0, Duration::from_secs(0) },
    five_by_four = { Duration::from_secs(5), 4, Duration::from_secs(20) },
)]
fn expiry_duration_multiplies_interval_by_liveness(interval: Duration, liveness: u32, expected: Duration) {
    let config = BrokerConfig { heartbeat_interval: interval, heartbeat_liveness: liveness, ..BrokerConfig::default() };
    assert_eq!(config.expiry_duration(), expected);
}

#[test]
#[serial]
fn from_env_overrides_port() {
    std::env::set_var("DISPATCH_PORT", "9999");
    let config = BrokerConfig::from_env();
    assert_eq!(config.port, 9999);
    std::env::remove_var("DISPATCH_PORT");
}

#[test]
#[serial]
fn from_env_falls_back_to_default_on_missing_var() {
    std::env::remove_var("DISPATCH_HEARTBEAT_LIVENESS");
    let config = BrokerConfig::from_env();
    assert_eq!(config.heartbeat_liveness, 3);
}
