//! Rule record parsing.
//!
//! A rule record is a flat hash of field names to string values, as returned
//! by `HGETALL`. Recognized fields:
//!
//! | Field | Type | Target |
//! |---|---|---|
//! | `service_name` | string | [`Rule::service_name`] |
//! | `name` | string | [`Rule::name`] |
//! | `enable` | boolean | [`Rule::enabled`] |
//! | `priority` | integer | [`Rule::priority`] |
//! | `type` | string | [`Rule::rule_type`] |
//! | `tag_value` | string | [`Rule::mark_value`] |
//! | `version` | `<min>-<max>` | [`Rule::min_version`], [`Rule::max_version`] |
//! | `user_ids` | comma-separated list | [`Rule::user_ids`] |
//! | `weight` | integer | [`Rule::weight`] |
//! | `path` | string | [`Rule::path`] |
//!
//! Unknown fields are ignored. Any malformed recognized field rejects the
//! whole record.

use thiserror::Error;

use crate::rules::types::{Rule, RuleType};

/// Why a rule record could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("field `{0}` has no value")]
    DanglingField(String),

    #[error("field `{field}` expects {expected}, got `{value}`")]
    InvalidValue {
        field: String,
        expected: &'static str,
        value: String,
    },

    #[error("version `{0}` invalid, expected `<min>-<max>`")]
    InvalidVersionRange(String),
}

/// Parse alternating field/value entries into a [`Rule`].
pub fn parse_rule<S: AsRef<str>>(entries: &[S]) -> Result<Rule, ParseError> {
    let mut rule = Rule::default();

    for pair in entries.chunks(2) {
        let field = pair[0].as_ref();
        let value = match pair.get(1) {
            Some(v) => v.as_ref(),
            None => return Err(ParseError::DanglingField(field.to_string())),
        };

        match field {
            "service_name" => rule.service_name = value.to_string(),
            "name" => rule.name = value.to_string(),
            "enable" => rule.enabled = parse_bool(field, value)?,
            "priority" => rule.priority = parse_int(field, value)?,
            "type" => rule.rule_type = RuleType::from(value),
            "tag_value" => rule.mark_value = value.to_string(),
            "version" => {
                let (min, max) = parse_version_range(value)?;
                rule.min_version = min.to_string();
                rule.max_version = max.to_string();
            }
            "user_ids" => {
                rule.user_ids = value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "weight" => rule.weight = parse_int(field, value)?,
            "path" => rule.path = value.to_string(),
            _ => {}
        }
    }

    Ok(rule)
}

fn parse_version_range(value: &str) -> Result<(&str, &str), ParseError> {
    let mut parts = value.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(min), Some(max), None) => Ok((min, max)),
        _ => Err(ParseError::InvalidVersionRange(value.to_string())),
    }
}

/// Accepts the spellings stores commonly write for booleans.
fn parse_bool(field: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(invalid(field, "a boolean", value)),
    }
}

fn parse_int(field: &str, value: &str) -> Result<i64, ParseError> {
    value.parse().map_err(|_| invalid(field, "an integer", value))
}

fn invalid(field: &str, expected: &'static str, value: &str) -> ParseError {
    ParseError::InvalidValue {
        field: field.to_string(),
        expected,
        value: value.to_string(),
    }
}
