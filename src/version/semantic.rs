use std::{cmp::Ordering, fmt};

use crate::{
    error::{FreshenError, Result},
    version::ParsedVersion,
};

/// A semantic version that remembers how it was written.
///
/// A leading `v` is ignored when parsing and comparing, but kept for
/// display so updates write back the form the upstream published.
/// Ordering follows semver precedence, so build metadata does not
/// participate.
#[derive(Debug, Clone)]
pub struct SemanticVersion {
    raw: String,
    parsed: semver::Version,
}

fn strip_prefix(raw: &str) -> &str {
    raw.strip_prefix('v').unwrap_or(raw)
}

impl SemanticVersion {
    pub fn version(&self) -> &semver::Version {
        &self.parsed
    }
}

impl ParsedVersion for SemanticVersion {
    fn is_valid(raw: &str) -> bool {
        semver::Version::parse(strip_prefix(raw)).is_ok()
    }

    fn parse(raw: &str) -> Result<Self> {
        let parsed = semver::Version::parse(strip_prefix(raw)).map_err(|e| {
            FreshenError::InvalidVersion(format!("{raw}: {e}"))
        })?;

        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    fn raw(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp_precedence(&other.parsed)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
