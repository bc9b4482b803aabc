use regex::Regex;
use std::{cmp::Ordering, sync::LazyLock};

use crate::version::{ParsedVersion, SemanticVersion};

static COMPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(>=|<=|!=|==|=|>|<)\s*(v?[0-9A-Za-z.+-]+)").unwrap()
});

fn compare(op: &str, ordering: Ordering) -> bool {
    match op {
        ">=" => ordering != Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        ">" => ordering == Ordering::Greater,
        "<" => ordering == Ordering::Less,
        "!=" => ordering != Ordering::Equal,
        _ => ordering == Ordering::Equal,
    }
}

/// Evaluates a list of explicit comparators such as `>=3.0.0, <4.0.0`.
/// Returns `None` when the expression is not made up entirely of
/// comparators against full semantic versions.
fn comparator_match(version: &SemanticVersion, expression: &str) -> Option<bool> {
    let mut found = false;
    let mut result = true;

    for caps in COMPARATOR.captures_iter(expression) {
        let bound = &caps[2];
        if !SemanticVersion::is_valid(bound) {
            return None;
        }
        let bound = SemanticVersion::parse(bound).ok()?;
        result &= compare(&caps[1], version.cmp(&bound));
        found = true;
    }

    let rest = COMPARATOR.replace_all(expression, "");
    let leftover = rest.chars().any(|c| !(c.is_whitespace() || c == ','));

    if !found || leftover {
        return None;
    }

    Some(result)
}

/// Whether `version` satisfies the range `expression`.
///
/// Plain comparator lists are evaluated directly. Anything else (`^1.2`,
/// `~1.2`, `1.*`, partial versions) goes through [`semver::VersionReq`].
/// An expression that cannot be understood matches nothing.
pub fn matches_expression(version: &SemanticVersion, expression: &str) -> bool {
    if let Some(result) = comparator_match(version, expression) {
        return result;
    }

    match semver::VersionReq::parse(expression.trim()) {
        Ok(req) => req.matches(version.version()),
        Err(_) => false,
    }
}

/// Decides whether a semantic pin must move to `latest`.
///
/// A valid `current` is compared by precedence. Anything else is treated as
/// a range: with `allow_expressions` the update is needed only when `latest`
/// falls outside it, and without it the pin is always flagged so that it
/// gets replaced by an exact version.
pub fn needs_update(
    current: &str,
    latest: &SemanticVersion,
    allow_expressions: bool,
) -> bool {
    if SemanticVersion::is_valid(current) {
        return match SemanticVersion::parse(current) {
            Ok(current) => *latest > current,
            Err(_) => true,
        };
    }

    if allow_expressions {
        return !matches_expression(latest, current);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> SemanticVersion {
        SemanticVersion::parse(raw).unwrap()
    }

    #[test]
    fn exact_versions_compare_by_precedence() {
        assert!(needs_update("1.3.1", &v("v1.4.0"), false));
        assert!(!needs_update("1.4.0", &v("v1.4.0"), false));
        assert!(!needs_update("2.0.0", &v("1.4.0"), false));
        assert!(!needs_update("v1.4.0", &v("1.4.0"), true));
    }

    #[test]
    fn ranges_always_update_without_expression_mode() {
        assert!(needs_update(">=3.0.0", &v("3.0.1"), false));
        assert!(needs_update("^1.0.0", &v("1.0.0"), false));
        assert!(needs_update("garbage", &v("1.0.0"), false));
    }

    #[test]
    fn ranges_update_only_when_outside_in_expression_mode() {
        assert!(needs_update(">=3.0.0", &v("2.0.0"), true));
        assert!(!needs_update(">=3.0.0", &v("3.5.0"), true));
        assert!(!needs_update(">=1.0.0, <2.0.0", &v("1.9.3"), true));
        assert!(needs_update(">=1.0.0 <2.0.0", &v("2.0.0"), true));
        assert!(needs_update("not a range", &v("1.0.0"), true));
    }

    #[test]
    fn comparator_lists() {
        assert!(matches_expression(&v("3.0.0"), ">=3.0.0"));
        assert!(matches_expression(&v("3.0.0"), "==3.0.0"));
        assert!(!matches_expression(&v("3.0.0"), "!=3.0.0"));
        assert!(matches_expression(&v("2.9.9"), "< 3.0.0"));
        assert!(!matches_expression(&v("3.0.0"), ">3.0.0"));
    }

    #[test]
    fn requirement_fallback() {
        assert!(matches_expression(&v("1.4.2"), "^1.2"));
        assert!(!matches_expression(&v("2.0.0"), "^1.2"));
        assert!(matches_expression(&v("1.2.9"), "~1.2"));
        assert!(matches_expression(&v("1.7.0"), "1.*"));
        assert!(matches_expression(&v("1.7.0"), ">=1.2"));
    }
}
