// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker configuration, with environment-variable overrides in the style
//! used throughout this workspace's daemon configuration.

use smol_str::SmolStr;
use std::time::Duration;

/// Recognized broker configuration, per the external interface contract.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerConfig {
    /// Logging label only; not used for routing.
    pub queue_name: SmolStr,
    pub port: u16,
    pub heartbeat_interval: Duration,
    pub heartbeat_liveness: u32,
    pub poller_timeout: Duration,
    pub thread_join_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            queue_name: SmolStr::new("default"),
            port: 5671,
            heartbeat_interval: Duration::from_millis(2_500),
            heartbeat_liveness: 3,
            poller_timeout: Duration::from_millis(250),
            thread_join_timeout: Duration::from_secs(5),
        }
    }
}

impl BrokerConfig {
    /// Worker expiry = `heartbeat_liveness * heartbeat_interval`.
    pub fn expiry_duration(&self) -> Duration {
        self.heartbeat_interval * self.heartbeat_liveness
    }

    /// Build a config from defaults overridden by environment variables:
    /// `DISPATCH_QUEUE_NAME`, `DISPATCH_PORT`,
    /// `DISPATCH_HEARTBEAT_INTERVAL_SEC`, `DISPATCH_HEARTBEAT_LIVENESS`,
    /// `DISPATCH_POLLER_TIMEOUT_MS`, `DISPATCH_THREAD_JOIN_TIMEOUT_SEC`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(name) = std::env::var("DISPATCH_QUEUE_NAME") {
            config.queue_name = SmolStr::new(name);
        }
        if let Some(port) = env_parse::<u16>("DISPATCH_PORT") {
            config.port = port;
        }
        if let Some(secs) = env_parse::<f64>("DISPATCH_HEARTBEAT_INTERVAL_SEC") {
            config.heartbeat_interval = Duration::from_secs_f64(secs);
        }
        if let Some(n) = env_parse::<u32>("DISPATCH_HEARTBEAT_LIVENESS") {
            config.heartbeat_liveness = n;
        }
        if let Some(ms) = env_parse::<u64>("DISPATCH_POLLER_TIMEOUT_MS") {
            config.poller_timeout = Duration::from_millis(ms);
        }
        if let Some(secs) = env_parse::<f64>("DISPATCH_THREAD_JOIN_TIMEOUT_SEC") {
            config.thread_join_timeout = Duration::from_secs_f64(secs);
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
