//! Rule data model.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Matching strategy selected by a rule's `type` field.
///
/// Unrecognized type names are kept as [`RuleType::Unknown`] so the rule
/// still loads, but it never matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleType {
    /// Request version header within `[min_version, max_version]`.
    Version,
    /// Resolved identity is in the allow-list.
    Identify,
    /// Identity bucket (`byte sum mod 100`) at or below `weight`.
    Weight,
    /// Full request URL contains `path`.
    Path,
    /// Anything else.
    #[default]
    Unknown,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Version => "version",
            RuleType::Identify => "identify",
            RuleType::Weight => "weight",
            RuleType::Path => "path",
            RuleType::Unknown => "unknown",
        }
    }
}

impl From<&str> for RuleType {
    fn from(value: &str) -> Self {
        match value {
            "version" => RuleType::Version,
            "identify" => RuleType::Identify,
            "weight" => RuleType::Weight,
            "path" => RuleType::Path,
            _ => RuleType::Unknown,
        }
    }
}

impl From<String> for RuleType {
    fn from(value: String) -> Self {
        RuleType::from(value.as_str())
    }
}

impl From<RuleType> for String {
    fn from(value: RuleType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single marking rule.
///
/// Rules are immutable once built; a refresh replaces the whole list rather
/// than editing rules in place. Fields that do not apply to the rule's type
/// are ignored by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    /// Logical service this rule is scoped to.
    #[serde(alias = "serviceName")]
    pub service_name: String,

    /// Human label, not used for matching.
    pub name: String,

    /// Disabled rules are skipped entirely.
    #[serde(alias = "enable")]
    pub enabled: bool,

    /// Higher priority is evaluated first.
    pub priority: i64,

    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// Value written to the mark header when this rule matches.
    #[serde(alias = "tag_value", alias = "tagValue")]
    pub mark_value: String,

    #[serde(alias = "minVersion")]
    pub min_version: String,
    #[serde(alias = "maxVersion")]
    pub max_version: String,

    /// Identity allow-list for `identify` rules.
    #[serde(alias = "userIds")]
    pub user_ids: BTreeSet<String>,

    /// Inclusive upper bound of the matching bucket range for `weight` rules.
    pub weight: i64,

    /// Substring searched for in the request URL for `path` rules.
    pub path: String,
}

/// The annotation produced by a matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mark {
    /// Header name the mark is written under.
    pub key: String,
    /// Mark value taken from the winning rule.
    pub value: String,
    /// Name of the winning rule.
    pub rule: String,
}

/// Sort rules by descending priority.
///
/// The sort is stable, so rules sharing a priority keep their input order
/// (fetch order for refreshed rules, file order for inline rules).
pub fn sort_by_priority(rules: &mut [Rule]) {
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
}
