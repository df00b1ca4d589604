//! Histogram kinds and summary statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TypeError;

/// Kind of a telemetry histogram.
///
/// Only `linear` and `exponential` histograms have meaningful numeric bucket
/// bounds; summary statistics are computed for those two kinds only.
/// Unrecognised kinds are preserved verbatim so exports stay faithful to the
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HistogramKind {
    Linear,
    Exponential,
    Boolean,
    Flag,
    Count,
    Enumerated,
    Categorical,
    Other(String),
}

impl HistogramKind {
    /// Whether bucket bounds are numeric and summary statistics apply.
    pub fn is_numeric(&self) -> bool {
        matches!(self, HistogramKind::Linear | HistogramKind::Exponential)
    }

    pub fn as_str(&self) -> &str {
        match self {
            HistogramKind::Linear => "linear",
            HistogramKind::Exponential => "exponential",
            HistogramKind::Boolean => "boolean",
            HistogramKind::Flag => "flag",
            HistogramKind::Count => "count",
            HistogramKind::Enumerated => "enumerated",
            HistogramKind::Categorical => "categorical",
            HistogramKind::Other(s) => s,
        }
    }
}

impl From<String> for HistogramKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "linear" => HistogramKind::Linear,
            "exponential" => HistogramKind::Exponential,
            "boolean" => HistogramKind::Boolean,
            "flag" => HistogramKind::Flag,
            "count" => HistogramKind::Count,
            "enumerated" => HistogramKind::Enumerated,
            "categorical" => HistogramKind::Categorical,
            _ => HistogramKind::Other(value),
        }
    }
}

impl From<HistogramKind> for String {
    fn from(value: HistogramKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for HistogramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics of a numeric histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
}

/// A single histogram: bucket lower bounds and the count in each bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    kind: HistogramKind,
    buckets: Vec<f64>,
    values: Vec<f64>,
    sum: Option<f64>,
}

impl Histogram {
    /// Create a histogram. `buckets` holds the lower bound of each bucket and
    /// must be index-aligned with `values`.
    ///
    /// `sum` is the sum of all recorded samples when the service reports it;
    /// without it the mean is estimated from bucket midpoints.
    pub fn new(
        kind: HistogramKind,
        buckets: Vec<f64>,
        values: Vec<f64>,
        sum: Option<f64>,
    ) -> Result<Self, TypeError> {
        if buckets.len() != values.len() {
            return Err(TypeError::Misaligned {
                context: format!("{} histogram", kind),
                left: "buckets",
                left_len: buckets.len(),
                right: "values",
                right_len: values.len(),
            });
        }
        Ok(Self {
            kind,
            buckets,
            values,
            sum,
        })
    }

    pub fn kind(&self) -> &HistogramKind {
        &self.kind
    }

    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Total number of samples across all buckets.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Upper bound of bucket `i`.
    ///
    /// The last bucket is open-ended; its width is extrapolated from the two
    /// bounds before it, additively for linear histograms and geometrically
    /// for exponential ones.
    fn bucket_end(&self, i: usize) -> f64 {
        if let Some(&next) = self.buckets.get(i + 1) {
            return next;
        }
        let n = self.buckets.len();
        let last = self.buckets[n - 1];
        if n < 2 {
            return last + 1.0;
        }
        let prev = self.buckets[n - 2];
        match self.kind {
            HistogramKind::Exponential if prev > 0.0 => last * (last / prev),
            _ => last + (last - prev),
        }
    }

    /// Arithmetic mean of the recorded samples.
    pub fn mean(&self) -> Option<f64> {
        let total = self.numeric_total()?;
        if let Some(sum) = self.sum {
            return Some(sum / total);
        }
        let weighted: f64 = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.buckets[i] + self.bucket_end(i)) / 2.0 * v)
            .sum();
        Some(weighted / total)
    }

    /// Estimate the `p`th percentile (0 to 100, clamped) by linear
    /// interpolation inside the bucket that contains it.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        let total = self.numeric_total()?;
        let target = p.clamp(0.0, 100.0) / 100.0 * total;

        let mut seen = 0.0;
        for (i, &v) in self.values.iter().enumerate() {
            if v > 0.0 && seen + v >= target {
                let lower = self.buckets[i];
                let upper = self.bucket_end(i);
                let fraction = ((target - seen) / v).clamp(0.0, 1.0);
                return Some(lower + (upper - lower) * fraction);
            }
            seen += v;
        }
        self.buckets.last().copied()
    }

    pub fn median(&self) -> Option<f64> {
        self.percentile(50.0)
    }

    /// Mean, median and quartiles; `None` for non-numeric or empty histograms.
    pub fn summary(&self) -> Option<SummaryStats> {
        Some(SummaryStats {
            mean: self.mean()?,
            median: self.median()?,
            p25: self.percentile(25.0)?,
            p75: self.percentile(75.0)?,
        })
    }

    fn numeric_total(&self) -> Option<f64> {
        if !self.kind.is_numeric() || self.buckets.is_empty() {
            return None;
        }
        let total = self.total();
        (total > 0.0).then_some(total)
    }
}
