//! Configuration loading from disk.
//!
//! JSON files may use either the native layout or the flat camelCase layout
//! of the gateway plugin configuration (`serviceName`, `redisAddr`, ...).

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::schema::MarkConfig;
use crate::rules::Rule;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML or JSON file.
///
/// Files ending in `.json` are read as JSON, everything else as TOML.
pub fn load_config(path: &Path) -> Result<MarkConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config = if is_json {
        parse_json(&content)?
    } else {
        parse_toml(&content)?
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

pub fn parse_toml(content: &str) -> Result<MarkConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Parse a JSON configuration in either layout.
///
/// A top-level `serviceName` key selects the plugin layout.
pub fn parse_json(content: &str) -> Result<MarkConfig, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if value.get("serviceName").is_some() {
        let plugin: PluginConfig = serde_json::from_value(value)?;
        Ok(plugin.into_config())
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

/// Flat plugin configuration. Absent keys keep the native defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PluginConfig {
    service_name: Option<String>,
    log_level: Option<String>,
    redis_addr: Option<String>,
    redis_password: Option<String>,
    redis_enable: Option<bool>,
    redis_rules_key: Option<String>,
    redis_rule_max_len: Option<i64>,
    redis_load_interval: Option<u64>,
    rules: Vec<Rule>,
    #[serde(rename = "MarkKey")]
    mark_key: Option<String>,
    header_version: Option<String>,
    header_identify: Option<String>,
    cookie_identify: Option<String>,
    #[serde(rename = "query_identify")]
    query_identify: Option<String>,
}

impl PluginConfig {
    fn into_config(self) -> MarkConfig {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        let mut config = MarkConfig::default();
        set(&mut config.service_name, self.service_name);
        set(&mut config.observability.log_level, self.log_level);
        set(&mut config.redis.address, self.redis_addr);
        set(&mut config.redis.password, self.redis_password);
        set(&mut config.redis.enabled, self.redis_enable);
        set(&mut config.redis.rules_key, self.redis_rules_key);
        set(&mut config.redis.rule_max_len, self.redis_rule_max_len);
        set(&mut config.redis.load_interval_secs, self.redis_load_interval);
        set(&mut config.mark_key, self.mark_key);
        set(&mut config.header_version, self.header_version);
        set(&mut config.header_identify, self.header_identify);
        set(&mut config.cookie_identify, self.cookie_identify);
        set(&mut config.query_identify, self.query_identify);
        config.rules = self.rules;
        config
    }
}
