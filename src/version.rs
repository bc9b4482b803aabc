//! Version schemes used to compare declared pins against upstream releases.
//!
//! Two schemes exist: strict semantic versions for Helm charts and
//! Kustomize tags, and permissive packaging versions for everything else.
//! Values from different schemes are never compared with each other.

/// Range expressions evaluated against semantic versions.
pub mod expression;

/// Permissive packaging versions that accept any string.
pub mod packaging;

/// Strict semantic versions with an optional leading `v`.
pub mod semantic;

use std::fmt::Display;

use crate::error::Result;

pub use expression::{matches_expression, needs_update};
pub use packaging::PackagingVersion;
pub use semantic::SemanticVersion;

/// Common interface for a parsed version in one scheme.
///
/// `is_valid` must be checked before `parse`; only schemes that can reject
/// input return an error from `parse`. `Display` renders the original
/// string exactly as it was given.
pub trait ParsedVersion: Sized + Ord + Display {
    fn is_valid(raw: &str) -> bool;
    fn parse(raw: &str) -> Result<Self>;
    fn raw(&self) -> &str;
}

/// Returns the original form of the highest valid version among `candidates`
/// under scheme `V`, skipping anything the scheme rejects.
pub fn latest_of<'a, V, I>(candidates: I) -> Option<String>
where
    V: ParsedVersion,
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|c| V::is_valid(c))
        .filter_map(|c| V::parse(c).ok())
        .max()
        .map(|v| v.raw().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_semantic_skips_invalid_entries() {
        let tags = vec!["1.2.0", "not-a-version", "v1.10.0", "1.9.9", "2.0"];
        assert_eq!(
            latest_of::<SemanticVersion, _>(tags),
            Some("v1.10.0".to_string())
        );
    }

    #[test]
    fn latest_packaging_prefers_valid_over_legacy() {
        let tags = vec!["release-candidate", "3.8.4", "3.8.10rc1", "3.8.10"];
        assert_eq!(
            latest_of::<PackagingVersion, _>(tags),
            Some("3.8.10".to_string())
        );
    }

    #[test]
    fn latest_of_empty_is_none() {
        let tags: Vec<&str> = vec!["main", "nightly"];
        assert_eq!(latest_of::<SemanticVersion, _>(tags), None);
    }
}
