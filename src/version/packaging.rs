use regex::Regex;
use std::{fmt, sync::LazyLock};

use crate::{error::Result, version::ParsedVersion};

static PEP440: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)^\s*v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?P<pre>[-_.]?(?P<pre_l>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?P<post>(?:-(?P<post_n1>[0-9]+))|(?:[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?))?
        (?P<dev>[-_.]?dev[-_.]?(?P<dev_n>[0-9]+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .unwrap()
});

static LEGACY_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9]+|[a-z]+").unwrap()
});

/// Position of an optional segment relative to present values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Marker<T> {
    Low,
    At(T),
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Text(String),
    Number(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ReleaseKey {
    epoch: u64,
    release: Vec<u64>,
    pre: Marker<(u8, u64)>,
    post: Marker<u64>,
    dev: Marker<u64>,
    local: Marker<Vec<Segment>>,
}

/// Sort key. Legacy strings that do not follow PEP 440 always sort below
/// conforming versions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Legacy(Vec<Segment>),
    Release(ReleaseKey),
}

/// A version that accepts any string, ordered by PEP 440 rules when the
/// string conforms and as a low legacy value otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackagingVersion {
    key: SortKey,
    raw: String,
}

impl PackagingVersion {
    /// Whether the string was parsed as a conforming release rather than a
    /// legacy value.
    pub fn is_conforming(&self) -> bool {
        matches!(self.key, SortKey::Release(_))
    }
}

fn number(value: Option<regex::Match<'_>>) -> Option<u64> {
    value.and_then(|m| m.as_str().parse().ok())
}

fn pre_rank(label: &str) -> u8 {
    match label.to_ascii_lowercase().as_str() {
        "a" | "alpha" => 0,
        "b" | "beta" => 1,
        _ => 2,
    }
}

fn segments(text: &str) -> Vec<Segment> {
    LEGACY_PART
        .find_iter(text)
        .map(|m| match m.as_str().parse::<u64>() {
            Ok(n) => Segment::Number(n),
            Err(_) => Segment::Text(m.as_str().to_ascii_lowercase()),
        })
        .collect()
}

fn release_key(raw: &str) -> Option<ReleaseKey> {
    let caps = PEP440.captures(raw)?;

    let epoch = match caps.name("epoch") {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    let mut release = caps
        .name("release")?
        .as_str()
        .split('.')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;
    while release.len() > 1 && release.last() == Some(&0) {
        release.pop();
    }

    let post = if caps.name("post").is_some() {
        let n = number(caps.name("post_n1")).or(number(caps.name("post_n2")));
        Marker::At(n.unwrap_or(0))
    } else {
        Marker::Low
    };

    let dev = if caps.name("dev").is_some() {
        Marker::At(number(caps.name("dev_n")).unwrap_or(0))
    } else {
        Marker::High
    };

    let pre = match caps.name("pre_l") {
        Some(label) => Marker::At((
            pre_rank(label.as_str()),
            number(caps.name("pre_n")).unwrap_or(0),
        )),
        // a bare dev release sorts before any pre-release of the same version
        None if caps.name("post").is_none() && caps.name("dev").is_some() => {
            Marker::Low
        }
        None => Marker::High,
    };

    let local = match caps.name("local") {
        Some(m) => Marker::At(segments(m.as_str())),
        None => Marker::Low,
    };

    Some(ReleaseKey {
        epoch,
        release,
        pre,
        post,
        dev,
        local,
    })
}

impl ParsedVersion for PackagingVersion {
    fn is_valid(_raw: &str) -> bool {
        true
    }

    fn parse(raw: &str) -> Result<Self> {
        let key = match release_key(raw) {
            Some(key) => SortKey::Release(key),
            None => SortKey::Legacy(segments(raw)),
        };

        Ok(Self {
            key,
            raw: raw.to_string(),
        })
    }

    fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PackagingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> PackagingVersion {
        PackagingVersion::parse(raw).unwrap()
    }

    #[test]
    fn everything_is_valid() {
        assert!(PackagingVersion::is_valid("1.0"));
        assert!(PackagingVersion::is_valid("definitely not a version"));
        assert!(PackagingVersion::is_valid(""));
    }

    #[test]
    fn conforming_detection() {
        assert!(v("1.0").is_conforming());
        assert!(v("v2.3.4").is_conforming());
        assert!(v("1!2.0.post3.dev1+ubuntu.1").is_conforming());
        assert!(!v("release-2020").is_conforming());
        assert!(!v("99999999999999999999999.0").is_conforming());
    }

    #[test]
    fn release_ordering() {
        assert!(v("1.0") < v("1.1"));
        assert!(v("1.9") < v("1.10"));
        assert!(v("19.10b0") < v("20.8b1"));
        assert!(v("v3.2.0") < v("v3.3.0"));
        assert!(v("1!0.1") > v("2.0"));
    }

    #[test]
    fn trailing_zeros_do_not_matter() {
        assert_eq!(v("1.0").key, v("1.0.0").key);
        assert!(v("1.0.0") < v("1.0.1"));
    }

    #[test]
    fn pre_post_and_dev_ordering() {
        assert!(v("1.0.dev0") < v("1.0a1"));
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b1") < v("1.0rc1"));
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0.post1"));
        assert!(v("1.0.post1.dev1") < v("1.0.post1"));
        assert!(v("1.0") < v("1.0+local.1"));
        assert_eq!(v("1.0alpha2").key, v("1.0a2").key);
    }

    #[test]
    fn legacy_sorts_below_conforming() {
        assert!(v("not-a-version") < v("0.0.1"));
        assert!(v("build-20") < v("build-100"));
    }

    #[test]
    fn display_keeps_original() {
        assert_eq!(v("v1.4.0").to_string(), "v1.4.0");
    }
}
