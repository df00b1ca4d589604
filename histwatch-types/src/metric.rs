//! Metric (histogram) names.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TypeError;

/// Name of a telemetry histogram, e.g. `GC_MS`.
///
/// Metric names become file stems in the export directory, so anything that
/// could escape that directory is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetricName(String);

impl MetricName {
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed != name
            || name.contains(['/', '\\', '\0'])
            || name.starts_with('.')
        {
            return Err(TypeError::InvalidMetric(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used for this metric's export, `<metric>.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MetricName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MetricName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MetricName> for String {
    fn from(value: MetricName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        let m = MetricName::new("GC_MS").unwrap();
        assert_eq!(m.as_str(), "GC_MS");
        assert_eq!(m.file_name(), "GC_MS.json");
        assert!(MetricName::new("STARTUP_CRASH_DETECTED").is_ok());
        assert!(MetricName::new("A11Y_IATABLE_USAGE_FLAG").is_ok());
    }

    #[test]
    fn test_rejects_path_like_names() {
        for bad in ["", "  ", "../etc", ".hidden", "a/b", "a\\b", " GC_MS"] {
            assert!(MetricName::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
