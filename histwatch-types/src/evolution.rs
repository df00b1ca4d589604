//! Histogram evolutions and their flattened export records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::number::{serialize_numbers, serialize_opt_number};
use crate::{format_timestamp, parse_date, Histogram, HistogramKind, MetricName, TypeError};

/// One dated histogram within an evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSample")]
pub struct Sample {
    /// Submission date of the aggregated pings.
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,

    /// Number of submissions (pings) aggregated into this sample.
    pub submissions: u64,

    /// Number of recorded values across all buckets.
    pub count: u64,

    /// Sum of all recorded values, when the service reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,

    /// Count per bucket, index-aligned with the evolution's buckets.
    pub histogram: Vec<f64>,
}

/// Wire form of a [`Sample`]. A missing `count` is derived from the histogram.
#[derive(Deserialize)]
struct RawSample {
    date: String,
    #[serde(default)]
    submissions: u64,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    sum: Option<f64>,
    histogram: Vec<f64>,
}

impl TryFrom<RawSample> for Sample {
    type Error = TypeError;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        let count = raw.count.unwrap_or_else(|| histogram_count(&raw.histogram));
        Ok(Self {
            date: parse_date(&raw.date)?,
            submissions: raw.submissions,
            count,
            sum: raw.sum,
            histogram: raw.histogram,
        })
    }
}

fn histogram_count(histogram: &[f64]) -> u64 {
    histogram.iter().sum::<f64>().round() as u64
}

impl Sample {
    /// Create a sample; `count` is derived from the histogram.
    pub fn new(date: &str, submissions: u64, histogram: Vec<f64>) -> Result<Self, TypeError> {
        let count = histogram_count(&histogram);
        Ok(Self {
            date: parse_date(date)?,
            submissions,
            count,
            sum: None,
            histogram,
        })
    }

    /// Attach the reported sum of recorded values.
    pub fn with_sum(mut self, sum: f64) -> Self {
        self.sum = Some(sum);
        self
    }
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
}

/// A histogram's evolution over submission dates for one build version.
///
/// An evolution may be split along a filter dimension (`filter_name`, e.g.
/// `os`); each option of that dimension maps to a child evolution in
/// `filters`, which may be split further. `measure`, `kind` and `buckets`
/// are inherited by children that omit them.
///
/// Only nodes that are not split along a dimension (no `filter_name`)
/// contribute their own samples when flattening: a split node's samples are
/// the aggregate of its children and would double count. Children are
/// always visited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<HistogramKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<Vec<f64>>,

    /// Name of the dimension this node is split along.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_name: Option<String>,

    #[serde(default)]
    pub data: Vec<Sample>,

    /// Child evolutions keyed by filter option label.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, Evolution>,
}

/// Values inherited from ancestors while walking the filter tree.
#[derive(Clone, Copy)]
struct Inherited<'a> {
    measure: &'a str,
    kind: Option<&'a HistogramKind>,
    buckets: Option<&'a [f64]>,
}

impl Evolution {
    pub fn builder() -> EvolutionBuilder {
        EvolutionBuilder::default()
    }

    /// Whether this node's own samples are emitted by [`flatten`](Self::flatten).
    pub fn is_leaf(&self) -> bool {
        self.filter_name.is_none()
    }

    /// Number of records [`flatten`](Self::flatten) produces.
    pub fn leaf_sample_count(&self) -> usize {
        let own = if self.is_leaf() { self.data.len() } else { 0 };
        own + self
            .filters
            .values()
            .map(Evolution::leaf_sample_count)
            .sum::<usize>()
    }

    /// Flatten the filter tree into one record per dated sample of every leaf.
    ///
    /// Records are tagged with the filter path (option labels from the root
    /// down). `metric` names the measure when no node of the tree does.
    pub fn flatten(&self, metric: &MetricName) -> Result<Vec<EvolutionRecord>, TypeError> {
        let root = Inherited {
            measure: metric.as_str(),
            kind: None,
            buckets: None,
        };
        let mut records = Vec::with_capacity(self.leaf_sample_count());
        self.flatten_into(root, &mut Vec::new(), &mut records)?;
        Ok(records)
    }

    fn flatten_into<'a>(
        &'a self,
        parent: Inherited<'a>,
        path: &mut Vec<String>,
        out: &mut Vec<EvolutionRecord>,
    ) -> Result<(), TypeError> {
        let here = Inherited {
            measure: self.measure.as_deref().unwrap_or(parent.measure),
            kind: self.kind.as_ref().or(parent.kind),
            buckets: self.buckets.as_deref().or(parent.buckets),
        };

        if self.is_leaf() {
            for sample in &self.data {
                out.push(EvolutionRecord::from_sample(here, sample, path)?);
            }
        }

        for (label, child) in &self.filters {
            path.push(label.clone());
            let result = child.flatten_into(here, path, out);
            path.pop();
            result?;
        }
        Ok(())
    }
}

/// Builder for [`Evolution`] trees.
#[derive(Debug, Default)]
pub struct EvolutionBuilder {
    evolution: Evolution,
}

impl EvolutionBuilder {
    pub fn measure(mut self, measure: impl Into<String>) -> Self {
        self.evolution.measure = Some(measure.into());
        self
    }

    pub fn kind(mut self, kind: HistogramKind) -> Self {
        self.evolution.kind = Some(kind);
        self
    }

    pub fn buckets(mut self, buckets: Vec<f64>) -> Self {
        self.evolution.buckets = Some(buckets);
        self
    }

    pub fn sample(mut self, sample: Sample) -> Self {
        self.evolution.data.push(sample);
        self
    }

    /// Add a child for option `label` of dimension `dimension`.
    pub fn filter(mut self, dimension: impl Into<String>, label: impl Into<String>, child: Evolution) -> Self {
        self.evolution.filter_name = Some(dimension.into());
        self.evolution.filters.insert(label.into(), child);
        self
    }

    pub fn build(self) -> Evolution {
        self.evolution
    }
}

/// One exported row: a single dated histogram of one filter path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionRecord {
    pub measure: String,
    pub filter: Vec<String>,
    pub kind: HistogramKind,
    /// UTC midnight timestamp of the sample date.
    pub date: String,
    pub submissions: u64,
    pub count: u64,
    #[serde(serialize_with = "serialize_numbers")]
    pub buckets: Vec<f64>,
    #[serde(serialize_with = "serialize_numbers")]
    pub values: Vec<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub mean: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub median: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub p25: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub p75: Option<f64>,
}

impl EvolutionRecord {
    fn from_sample(ctx: Inherited<'_>, sample: &Sample, path: &[String]) -> Result<Self, TypeError> {
        let missing = |field| TypeError::MissingField {
            field,
            path: path.join("/"),
        };
        let kind = ctx.kind.ok_or_else(|| missing("kind"))?.clone();
        let buckets = ctx.buckets.ok_or_else(|| missing("buckets"))?;

        if buckets.len() != sample.histogram.len() {
            return Err(TypeError::Misaligned {
                context: format!("{} on {} [{}]", ctx.measure, sample.date, path.join("/")),
                left: "buckets",
                left_len: buckets.len(),
                right: "histogram",
                right_len: sample.histogram.len(),
            });
        }

        let histogram = Histogram::new(
            kind.clone(),
            buckets.to_vec(),
            sample.histogram.clone(),
            sample.sum,
        )?;
        let stats = histogram.summary();

        Ok(Self {
            measure: ctx.measure.to_string(),
            filter: path.to_vec(),
            kind,
            date: format_timestamp(sample.date),
            submissions: sample.submissions,
            count: sample.count,
            buckets: buckets.to_vec(),
            values: sample.histogram.clone(),
            mean: stats.map(|s| s.mean),
            median: stats.map(|s| s.median),
            p25: stats.map(|s| s.p25),
            p75: stats.map(|s| s.p75),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric() -> MetricName {
        MetricName::new("GC_MS").unwrap()
    }

    fn samples(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::new(&format!("2015-06-{:02}", i + 1), 5, vec![1.0, 2.0, 3.0]).unwrap())
            .collect()
    }

    fn leaf(n: usize) -> Evolution {
        Evolution {
            data: samples(n),
            ..Default::default()
        }
    }

    fn root() -> EvolutionBuilder {
        Evolution::builder()
            .measure("GC_MS")
            .kind(HistogramKind::Linear)
            .buckets(vec![0.0, 10.0, 20.0])
    }

    #[test]
    fn test_flat_evolution_yields_one_record_per_sample() {
        let mut b = root();
        for s in samples(4) {
            b = b.sample(s);
        }
        let records = b.build().flatten(&metric()).unwrap();

        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.filter.is_empty()));
        assert_eq!(records[0].date, "2015-06-01T00:00:00.000Z");
        assert_eq!(records[0].count, 6);
        assert_eq!(records[0].buckets, vec![0.0, 10.0, 20.0]);
        assert!(records[0].median.is_some());
    }

    #[test]
    fn test_nested_filters_sum_leaf_samples() {
        let linux = Evolution::builder()
            .filter("channel", "nightly", leaf(2))
            .filter("channel", "aurora", leaf(3))
            .build();
        let evolution = root()
            // Inner-node samples are aggregates and must not be emitted.
            .sample(samples(1).remove(0))
            .filter("os", "Linux", linux)
            .filter("os", "Windows", leaf(4))
            .build();

        assert_eq!(evolution.leaf_sample_count(), 9);
        let records = evolution.flatten(&metric()).unwrap();
        assert_eq!(records.len(), 9);

        let paths: Vec<Vec<String>> = records.iter().map(|r| r.filter.clone()).collect();
        assert!(paths.contains(&vec!["Linux".to_string(), "aurora".to_string()]));
        assert!(paths.contains(&vec!["Windows".to_string()]));
        assert_eq!(
            paths.iter().filter(|p| p.as_slice() == ["Linux", "nightly"]).count(),
            2
        );
        assert!(records.iter().all(|r| r.measure == "GC_MS" && r.kind == HistogramKind::Linear));
    }

    #[test]
    fn test_child_overrides_inherited_fields() {
        let child = Evolution {
            buckets: Some(vec![0.0, 1.0]),
            data: vec![Sample::new("2015-06-01", 1, vec![1.0, 1.0]).unwrap()],
            ..Default::default()
        };
        let evolution = root().filter("os", "Mac", child).build();
        let records = evolution.flatten(&metric()).unwrap();
        assert_eq!(records[0].buckets, vec![0.0, 1.0]);
    }

    #[test]
    fn test_missing_kind_is_an_error() {
        let evolution = Evolution {
            buckets: Some(vec![0.0, 1.0, 2.0]),
            data: samples(1),
            ..Default::default()
        };
        let err = evolution.flatten(&metric()).unwrap_err();
        assert!(matches!(err, TypeError::MissingField { field: "kind", .. }));
    }

    #[test]
    fn test_misaligned_sample_is_an_error() {
        let evolution = root()
            .sample(Sample::new("2015-06-01", 1, vec![1.0]).unwrap())
            .build();
        assert!(matches!(
            evolution.flatten(&metric()),
            Err(TypeError::Misaligned { .. })
        ));
    }

    #[test]
    fn test_non_numeric_kind_omits_stats() {
        let evolution = Evolution::builder()
            .kind(HistogramKind::Flag)
            .buckets(vec![0.0, 1.0, 2.0])
            .sample(Sample::new("2015-06-01", 1, vec![1.0, 0.0, 0.0]).unwrap())
            .build();
        let records = evolution.flatten(&metric()).unwrap();
        assert!(records[0].mean.is_none());

        let json = serde_json::to_value(&records[0]).unwrap();
        assert!(json.get("mean").is_none());
        assert_eq!(json["measure"], "GC_MS");
        assert_eq!(json["kind"], "flag");
        assert_eq!(json["buckets"], serde_json::json!([0, 1, 2]));
    }

    #[test]
    fn test_deserialize_service_payload() {
        let json = r#"{
            "measure": "GC_MS",
            "kind": "exponential",
            "buckets": [0, 1, 2, 5],
            "filter_name": "os",
            "data": [],
            "filters": {
                "Windows": {
                    "data": [
                        {"date": "20150601", "submissions": 10, "count": 100,
                         "sum": 250.0, "histogram": [10, 40, 30, 20]}
                    ]
                }
            }
        }"#;

        let evolution: Evolution = serde_json::from_str(json).unwrap();
        let records = evolution.flatten(&metric()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.filter, vec!["Windows".to_string()]);
        assert_eq!(r.date, "2015-06-01T00:00:00.000Z");
        assert_eq!(r.submissions, 10);
        assert_eq!(r.mean, Some(2.5));
        assert_eq!(r.median, Some(2.0));
    }

    #[test]
    fn test_missing_count_is_derived_from_histogram() {
        let json = r#"{"date": "2015-06-01", "submissions": 3, "histogram": [10, 40, 50]}"#;
        let sample: Sample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.count, 100);
        assert_eq!(sample, Sample::new("2015-06-01", 3, vec![10.0, 40.0, 50.0]).unwrap());

        let evolution = Evolution::builder()
            .kind(HistogramKind::Linear)
            .buckets(vec![0.0, 1.0, 2.0])
            .sample(sample)
            .build();
        let records = evolution.flatten(&metric()).unwrap();
        assert_eq!(records[0].count, 100);
    }

    #[test]
    fn test_reported_count_is_kept() {
        let json = r#"{"date": "2015-06-01", "count": 7, "histogram": [1, 1]}"#;
        let sample: Sample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.count, 7);
        assert_eq!(sample.submissions, 0);
    }

    #[test]
    fn test_split_node_without_children_emits_nothing() {
        let evolution = root()
            .sample(samples(1).remove(0))
            .build();
        let split = Evolution {
            filter_name: Some("os".to_string()),
            ..evolution.clone()
        };

        assert_eq!(evolution.flatten(&metric()).unwrap().len(), 1);
        assert_eq!(split.leaf_sample_count(), 0);
        assert!(split.flatten(&metric()).unwrap().is_empty());
    }

    #[test]
    fn test_unsplit_node_emits_own_and_child_samples() {
        let mut evolution = root().sample(samples(1).remove(0)).build();
        evolution.filters.insert("Linux".to_string(), leaf(2));

        let records = evolution.flatten(&metric()).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].filter.is_empty());
        assert_eq!(records[1].filter, vec!["Linux".to_string()]);
    }

    #[test]
    fn test_bad_sample_date_rejected() {
        let json = r#"{"data": [{"date": "soon", "histogram": []}]}"#;
        assert!(serde_json::from_str::<Evolution>(json).is_err());
    }
}
