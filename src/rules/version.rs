//! Dotted numeric version comparison.
//!
//! The comparator is lenient: a component that is not an integer counts as
//! `0` and a missing trailing component counts as `0`, so it never fails.
//! Use [`is_well_formed`] where a malformed version must be rejected.

use std::cmp::Ordering;

/// Compare two dotted version strings component-wise as integers.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        let (x, y) = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (x, y) => (component(x), component(y)),
        };
        match x.cmp(&y) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }
}

fn component(part: Option<&str>) -> i64 {
    part.and_then(|p| p.parse().ok()).unwrap_or(0)
}

/// True if every dot-separated component of `version` is an unsigned integer.
pub fn is_well_formed(version: &str) -> bool {
    !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_versions() {
        assert_eq!(compare("1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(compare("1.2", "1.2.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_numeric_not_lexical() {
        assert_eq!(compare("1.9", "1.10"), Ordering::Less);
        assert_eq!(compare("2", "1.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_malformed_components_are_zero() {
        assert_eq!(compare("1.x", "1.0"), Ordering::Equal);
        assert_eq!(compare("", "0"), Ordering::Equal);
        assert_eq!(compare("beta", "0.1"), Ordering::Less);
    }

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed("1.10.0"));
        assert!(is_well_formed("7"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("1..2"));
        assert!(!is_well_formed("1.2-rc1"));
    }
}
