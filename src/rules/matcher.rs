//! Rule matching logic.
//!
//! # Responsibilities
//! - Decide whether a single rule applies to a request
//! - One strategy per rule type, selected by [`RuleType`]
//!
//! # Design Decisions
//! - Matchers are pure and never fail; a lookup miss is a non-match
//! - Path matching is a case-sensitive substring search, no glob or regex
//! - Rules missing the fields their type needs never match

use std::cmp::Ordering;

use crate::rules::identity::RequestContext;
use crate::rules::types::{Rule, RuleType};
use crate::rules::version;

/// Returns true if `rule` matches the request described by `ctx`.
///
/// Does not look at `enabled` or `service_name`; the evaluator filters those.
pub fn matches(rule: &Rule, ctx: &RequestContext<'_>) -> bool {
    match rule.rule_type {
        RuleType::Path => match_path(rule, ctx),
        RuleType::Identify => match_identify(rule, ctx),
        RuleType::Version => match_version(rule, ctx),
        RuleType::Weight => match_weight(rule, ctx),
        RuleType::Unknown => false,
    }
}

fn match_path(rule: &Rule, ctx: &RequestContext<'_>) -> bool {
    ctx.url().contains(rule.path.as_str())
}

fn match_identify(rule: &Rule, ctx: &RequestContext<'_>) -> bool {
    ctx.identity()
        .map(|id| rule.user_ids.contains(id))
        .unwrap_or(false)
}

fn match_version(rule: &Rule, ctx: &RequestContext<'_>) -> bool {
    if !version::is_well_formed(&rule.min_version) || !version::is_well_formed(&rule.max_version) {
        return false;
    }
    let Some(requested) = ctx.version() else {
        return false;
    };
    version::compare(requested, &rule.min_version) != Ordering::Less
        && version::compare(&rule.max_version, requested) != Ordering::Less
}

fn match_weight(rule: &Rule, ctx: &RequestContext<'_>) -> bool {
    match ctx.bucket() {
        Some(bucket) => i64::try_from(bucket).map_or(false, |b| b <= rule.weight),
        None => {
            tracing::debug!(rule = %rule.name, "No identity for weight rule");
            false
        }
    }
}
