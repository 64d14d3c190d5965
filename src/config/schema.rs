//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the marker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::rules::Rule;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkConfig {
    /// Logical service this instance marks traffic for. Only rules with the
    /// same `service_name` are evaluated.
    pub service_name: String,

    /// Header the mark is written to.
    pub mark_key: String,

    /// Request header carrying the client version.
    pub header_version: String,

    /// Request header carrying the caller identity.
    pub header_identify: String,

    /// Cookie carrying the caller identity.
    pub cookie_identify: String,

    /// Query parameter carrying the caller identity.
    pub query_identify: String,

    /// Inline rules, active until the first successful store refresh.
    pub rules: Vec<Rule>,

    /// Listener and upstream settings.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// External rule store.
    pub redis: RedisConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            mark_key: "x-mark".to_string(),
            header_version: "x-version".to_string(),
            header_identify: "x-user-id".to_string(),
            cookie_identify: "uid".to_string(),
            query_identify: "uid".to_string(),
            rules: Vec::new(),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            redis: RedisConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl MarkConfig {
    /// Copy of the config safe to log: the store password is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.redis.password.is_empty() {
            copy.redis.password = "******".to_string();
        }
        copy
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Address marked requests are forwarded to (e.g., "127.0.0.1:3000").
    pub upstream: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            upstream: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Redis-compatible rule store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Enable periodic rule refresh from the store.
    pub enabled: bool,

    /// Store address (e.g., "127.0.0.1:6379").
    pub address: String,

    /// Sent with `AUTH` after connecting when non-empty.
    pub password: String,

    /// List holding the rule record keys.
    pub rules_key: String,

    /// Last index fetched from the key list (`LRANGE key 0 rule_max_len`).
    pub rule_max_len: i64,

    /// Refresh interval in seconds.
    pub load_interval_secs: u64,

    /// Longest wait for the store to answer one command, in seconds.
    pub response_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:6379".to_string(),
            password: String::new(),
            rules_key: "request_mark:rules".to_string(),
            rule_max_len: 100,
            load_interval_secs: 30,
            response_timeout_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
