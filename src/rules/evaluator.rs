//! First-match-wins rule evaluation.

use crate::rules::identity::RequestContext;
use crate::rules::matcher;
use crate::rules::types::Rule;

/// Return the first rule in `rules` that applies to the request.
///
/// `rules` must already be sorted by descending priority. Disabled rules and
/// rules scoped to another service are skipped. Evaluation stops at the first
/// match; marks from several rules are never merged.
pub fn first_match<'r>(
    rules: &'r [Rule],
    ctx: &RequestContext<'_>,
    service_name: &str,
) -> Option<&'r Rule> {
    rules
        .iter()
        .filter(|rule| rule.enabled && rule.service_name == service_name)
        .find(|rule| matcher::matches(rule, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::identity::LookupFields;
    use crate::rules::types::RuleType;
    use axum::http::Request;

    fn path_rule(name: &str, priority: i64, path: &str) -> Rule {
        Rule {
            service_name: "orders".into(),
            name: name.into(),
            enabled: true,
            priority,
            rule_type: RuleType::Path,
            mark_value: name.into(),
            path: path.into(),
            ..Rule::default()
        }
    }

    fn winner(rules: &[Rule], uri: &str, headers: &[(&str, &str)]) -> Option<String> {
        let fields = LookupFields {
            header_identify: "x-user-id".into(),
            ..LookupFields::default()
        };
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder.body(()).unwrap();
        let ctx = RequestContext::from_request(&req, &fields);
        first_match(rules, &ctx, "orders").map(|r| r.name.clone())
    }

    #[test]
    fn test_first_match_wins() {
        let a = path_rule("a", 10, "/beta");
        let b = Rule {
            name: "b".into(),
            priority: 5,
            rule_type: RuleType::Weight,
            weight: 100,
            ..a.clone()
        };
        let rules = vec![a, b];

        assert_eq!(winner(&rules, "/beta/cart", &[("x-user-id", "u1")]), Some("a".into()));
        assert_eq!(winner(&rules, "/cart", &[("x-user-id", "u1")]), Some("b".into()));
        assert_eq!(winner(&rules, "/cart", &[]), None);
    }

    #[test]
    fn test_skips_disabled_and_foreign_rules() {
        let disabled = Rule {
            enabled: false,
            ..path_rule("disabled", 30, "/")
        };
        let foreign = Rule {
            service_name: "payments".into(),
            ..path_rule("foreign", 20, "/")
        };
        let own = path_rule("own", 10, "/");
        let rules = vec![disabled, foreign, own];

        assert_eq!(winner(&rules, "/x", &[]), Some("own".into()));
    }

    #[test]
    fn test_empty_rule_list() {
        assert_eq!(winner(&[], "/x", &[]), None);
    }
}
