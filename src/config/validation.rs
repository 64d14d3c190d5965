//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Header names must be valid HTTP header names
//! - Store settings must be usable when the store is enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MarkConfig → Result<(), Vec<ValidationError>>
//! - Inline rules are not validated; a rule missing fields never matches

use std::fmt;
use std::net::SocketAddr;

use axum::http::{uri::Authority, HeaderName};

use crate::config::schema::MarkConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &MarkConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service_name.trim().is_empty() {
        errors.push(ValidationError::new("service_name", "must not be empty"));
    }

    if HeaderName::try_from(config.mark_key.as_str()).is_err() {
        errors.push(ValidationError::new(
            "mark_key",
            format!("`{}` is not a valid header name", config.mark_key),
        ));
    }

    for (field, value) in [
        ("header_version", &config.header_version),
        ("header_identify", &config.header_identify),
    ] {
        // Empty disables the lookup.
        if !value.is_empty() && HeaderName::try_from(value.as_str()).is_err() {
            errors.push(ValidationError::new(
                field,
                format!("`{}` is not a valid header name", value),
            ));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    if config.listener.upstream.parse::<Authority>().is_err() {
        errors.push(ValidationError::new(
            "listener.upstream",
            format!("`{}` is not a host:port authority", config.listener.upstream),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let redis = &config.redis;
    if redis.enabled {
        if redis.address.trim().is_empty() {
            errors.push(ValidationError::new("redis.address", "must not be empty"));
        }
        if redis.rules_key.trim().is_empty() {
            errors.push(ValidationError::new("redis.rules_key", "must not be empty"));
        }
        if redis.load_interval_secs == 0 {
            errors.push(ValidationError::new(
                "redis.load_interval_secs",
                "must be greater than 0",
            ));
        }
        if redis.response_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "redis.response_timeout_secs",
                "must be greater than 0",
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
