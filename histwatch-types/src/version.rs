//! Build version identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TypeError;

/// A build version as reported by the telemetry service, e.g. `nightly/42`.
///
/// Ordering is lexicographic on the full identifier, so `nightly/100` sorts
/// before `nightly/41`. The service has always been consumed that way and the
/// "most recent builds" selection depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId {
    raw: String,
    slash: usize,
}

impl VersionId {
    /// Parse a `channel/build` identifier.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidVersion(s.to_string());
        let slash = s.find('/').ok_or_else(invalid)?;
        let (channel, build) = (&s[..slash], &s[slash + 1..]);
        if channel.is_empty() || build.is_empty() || build.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            raw: s.to_string(),
            slash,
        })
    }

    /// Release channel, e.g. `nightly`.
    pub fn channel(&self) -> &str {
        &self.raw[..self.slash]
    }

    /// Build number within the channel, e.g. `42`.
    pub fn build(&self) -> &str {
        &self.raw[self.slash + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionId> for String {
    fn from(value: VersionId) -> Self {
        value.raw
    }
}

/// Keep the `count` most recent versions whose identifier starts with `prefix`.
///
/// Matching versions are sorted ascending and deduplicated; the tail of the
/// sorted list is returned, still in ascending order.
pub fn select_recent<I>(versions: I, prefix: &str, count: usize) -> Vec<VersionId>
where
    I: IntoIterator<Item = VersionId>,
{
    let mut matching: Vec<VersionId> = versions
        .into_iter()
        .filter(|v| v.as_str().starts_with(prefix))
        .collect();
    matching.sort();
    matching.dedup();

    let skip = matching.len().saturating_sub(count);
    matching.split_off(skip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<VersionId> {
        raw.iter().map(|s| VersionId::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_parse_parts() {
        let v = VersionId::parse("nightly/42").unwrap();
        assert_eq!(v.channel(), "nightly");
        assert_eq!(v.build(), "42");
        assert_eq!(v.to_string(), "nightly/42");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["nightly", "/42", "nightly/", "a/b/c", ""] {
            assert!(VersionId::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_select_recent_keeps_last_three_nightlies() {
        let versions = ids(&[
            "nightly/39",
            "aurora/41",
            "nightly/41",
            "beta/40",
            "nightly/38",
            "nightly/40",
        ]);

        let selected = select_recent(versions, "nightly", 3);
        assert_eq!(selected, ids(&["nightly/39", "nightly/40", "nightly/41"]));
    }

    #[test]
    fn test_select_recent_properties() {
        let inputs = [
            vec![],
            ids(&["aurora/1", "beta/2"]),
            ids(&["nightly/1"]),
            ids(&["nightly/5", "nightly/5", "nightly/3"]),
            ids(&["nightly/9", "nightly/10", "nightly/11", "nightly/12", "release/99"]),
        ];

        for input in inputs {
            let selected = select_recent(input, "nightly", 3);
            assert!(selected.len() <= 3);
            assert!(selected.iter().all(|v| v.as_str().starts_with("nightly")));
            assert!(selected.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_select_recent_is_lexicographic() {
        let selected = select_recent(ids(&["nightly/9", "nightly/10", "nightly/100"]), "nightly", 1);
        assert_eq!(selected, ids(&["nightly/9"]));
    }

    #[test]
    fn test_serde_as_string() {
        let v: VersionId = serde_json::from_str("\"nightly/40\"").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"nightly/40\"");
        assert!(serde_json::from_str::<VersionId>("\"nightly\"").is_err());
    }
}
