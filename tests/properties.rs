//! Property tests for version comparison and evaluation order.

use std::cmp::Ordering;

use axum::http::Request;
use proptest::prelude::*;
use request_mark::rules::version::compare;
use request_mark::rules::{evaluator, LookupFields, RequestContext, Rule, RuleSnapshot, RuleType};

/// Generate a dotted version of one to four numeric components.
fn arb_version() -> impl Strategy<Value = String> {
    prop::collection::vec(0u32..20, 1..=4).prop_map(|parts| {
        parts
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    })
}

/// Generate an enabled path rule for service `orders` with a small path alphabet.
fn arb_rule() -> impl Strategy<Value = Rule> {
    (
        -5i64..5,
        prop_oneof![Just("/a"), Just("/b"), Just("/a/b"), Just("?x")],
        any::<bool>(),
    )
        .prop_map(|(priority, path, enabled)| Rule {
            service_name: "orders".into(),
            name: format!("{}@{}", path, priority),
            enabled,
            priority,
            rule_type: RuleType::Path,
            mark_value: path.to_string(),
            path: path.to_string(),
            ..Rule::default()
        })
}

fn winner(snapshot: &RuleSnapshot, uri: &str) -> Option<i64> {
    let fields = LookupFields::default();
    let req = Request::builder().uri(uri).body(()).unwrap();
    let ctx = RequestContext::from_request(&req, &fields);
    evaluator::first_match(snapshot.rules(), &ctx, "orders").map(|r| r.priority)
}

proptest! {
    /// compare is reflexive.
    #[test]
    fn compare_reflexive(v in arb_version()) {
        prop_assert_eq!(compare(&v, &v), Ordering::Equal);
    }

    /// compare is antisymmetric.
    #[test]
    fn compare_antisymmetric(a in arb_version(), b in arb_version()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    /// Trailing zero components never change the result.
    #[test]
    fn compare_ignores_trailing_zeros(a in arb_version(), b in arb_version()) {
        let padded = format!("{}.0.0", a);
        prop_assert_eq!(compare(&a, &b), compare(&padded, &b));
    }

    /// The winning priority does not depend on the order rules were loaded in.
    #[test]
    fn winner_priority_independent_of_input_order(
        rules in prop::collection::vec(arb_rule(), 0..8),
        uri in prop_oneof![Just("/a/b?x=1"), Just("/b"), Just("/c")],
    ) {
        let mut reversed = rules.clone();
        reversed.reverse();

        let forward = RuleSnapshot::new(rules);
        let backward = RuleSnapshot::new(reversed);
        prop_assert_eq!(winner(&forward, uri), winner(&backward, uri));
    }

    /// No enabled matching rule outranks the winner.
    #[test]
    fn winner_has_highest_matching_priority(
        rules in prop::collection::vec(arb_rule(), 1..8),
        uri in prop_oneof![Just("/a/b?x=1"), Just("/b")],
    ) {
        let best = rules
            .iter()
            .filter(|r| r.enabled && uri.contains(r.path.as_str()))
            .map(|r| r.priority)
            .max();
        prop_assert_eq!(winner(&RuleSnapshot::new(rules), uri), best);
    }
}
