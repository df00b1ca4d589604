//! Regression reports consumed by the dashboard.
//!
//! The report is produced by an offline analysis step and maps a build date
//! to the metrics whose distribution shifted on that date:
//!
//! ```json
//! {
//!   "2015-06-02": {
//!     "GC_MS": {
//!       "buckets": [0, 1, 2],
//!       "regression": [0.1, 0.2, 0.7],
//!       "reference": [0.3, 0.4, 0.3],
//!       "description": "GC pauses moved to the upper buckets"
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{parse_date, TypeError};

/// Comparison of a metric's current distribution against its reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionRecord {
    pub buckets: Vec<f64>,
    pub regression: Vec<f64>,
    pub reference: Vec<f64>,
    #[serde(default)]
    pub description: String,
}

impl RegressionRecord {
    /// Check that `buckets`, `regression` and `reference` are index-aligned.
    pub fn validate(&self, context: &str) -> Result<(), TypeError> {
        let misaligned = |right: &'static str, right_len: usize| TypeError::Misaligned {
            context: context.to_string(),
            left: "buckets",
            left_len: self.buckets.len(),
            right,
            right_len,
        };
        if self.regression.len() != self.buckets.len() {
            return Err(misaligned("regression", self.regression.len()));
        }
        if self.reference.len() != self.buckets.len() {
            return Err(misaligned("reference", self.reference.len()));
        }
        Ok(())
    }
}

/// All regressions, grouped by build date and then by metric name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegressionReport {
    dates: BTreeMap<NaiveDate, BTreeMap<String, RegressionRecord>>,
}

impl RegressionReport {
    /// Parse and validate a report document.
    ///
    /// Date keys may be plain dates or timestamps; timestamps are reduced to
    /// their date, and metrics of keys that land on the same date are merged.
    pub fn from_json(content: &str) -> Result<Self, TypeError> {
        let raw: BTreeMap<String, BTreeMap<String, RegressionRecord>> =
            serde_json::from_str(content)?;
        Self::from_raw(raw)
    }

    pub fn from_raw(
        raw: BTreeMap<String, BTreeMap<String, RegressionRecord>>,
    ) -> Result<Self, TypeError> {
        let mut dates: BTreeMap<NaiveDate, BTreeMap<String, RegressionRecord>> = BTreeMap::new();
        for (key, metrics) in raw {
            let date = parse_date(&key)?;
            for (metric, record) in &metrics {
                record.validate(&format!("{} {}", key, metric))?;
            }
            dates.entry(date).or_default().extend(metrics);
        }
        Ok(Self { dates })
    }

    /// Insert a single record, validating it.
    pub fn insert(
        &mut self,
        date: NaiveDate,
        metric: impl Into<String>,
        record: RegressionRecord,
    ) -> Result<(), TypeError> {
        let metric = metric.into();
        record.validate(&format!("{} {}", date, metric))?;
        self.dates.entry(date).or_default().insert(metric, record);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of distinct dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&BTreeMap<String, RegressionRecord>> {
        self.dates.get(&date)
    }

    /// Dates with their regressions, most recent first.
    pub fn iter_newest_first(
        &self,
    ) -> impl Iterator<Item = (NaiveDate, &BTreeMap<String, RegressionRecord>)> {
        self.dates.iter().rev().map(|(d, m)| (*d, m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> RegressionRecord {
        RegressionRecord {
            buckets: (0..n).map(|i| i as f64).collect(),
            regression: vec![0.5; n],
            reference: vec![0.25; n],
            description: String::new(),
        }
    }

    #[test]
    fn test_dates_newest_first() {
        let json = r#"{
            "2023-01-01": {"A": {"buckets": [0], "regression": [1], "reference": [1]}},
            "2023-01-02": {"B": {"buckets": [0], "regression": [1], "reference": [1]}}
        }"#;
        let report = RegressionReport::from_json(json).unwrap();
        let dates: Vec<String> = report.iter_newest_first().map(|(d, _)| d.to_string()).collect();
        assert_eq!(dates, vec!["2023-01-02", "2023-01-01"]);
    }

    #[test]
    fn test_timestamp_keys_merge_into_date() {
        let json = r#"{
            "2023-01-01": {"A": {"buckets": [0], "regression": [1], "reference": [1]}},
            "2023-01-01T10:00:00Z": {"B": {"buckets": [0], "regression": [1], "reference": [1]}}
        }"#;
        let report = RegressionReport::from_json(json).unwrap();
        assert_eq!(report.len(), 1);
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(report.get(date).unwrap().len(), 2);
    }

    #[test]
    fn test_misaligned_record_rejected() {
        let json = r#"{
            "2023-01-01": {"GC_MS": {"buckets": [0, 1], "regression": [1], "reference": [1, 2]}}
        }"#;
        let err = RegressionReport::from_json(json).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("2023-01-01 GC_MS"), "{message}");
        assert!(message.contains("regression"), "{message}");
    }

    #[test]
    fn test_bad_date_key_rejected() {
        let json = r#"{"someday": {}}"#;
        assert!(matches!(
            RegressionReport::from_json(json),
            Err(TypeError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_insert_validates() {
        let mut report = RegressionReport::default();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(report.insert(date, "A", record(3)).is_ok());

        let mut bad = record(3);
        bad.reference.pop();
        assert!(report.insert(date, "B", bad).is_err());
        assert_eq!(report.get(date).unwrap().len(), 1);
    }
}
