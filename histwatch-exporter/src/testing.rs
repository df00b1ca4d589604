//! In-memory telemetry service for pipeline tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use histwatch_telemetry::{FilterOptions, TelemetryError, TelemetryService, METRIC_DIMENSION};
use histwatch_types::{Evolution, HistogramKind, MetricName, Sample, VersionId};

/// Serves a fixed set of versions and synthesizes a two-sample evolution for
/// every (version, metric) pair it knows.
#[derive(Default)]
pub struct FakeService {
    versions: Vec<(VersionId, Vec<String>)>,
    failing: HashSet<String>,
    fail_versions: bool,
    gate: Option<usize>,
    calls: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, id: &str, metrics: &[&str]) -> Self {
        let id = VersionId::parse(id).unwrap();
        self.versions
            .push((id, metrics.iter().map(|m| m.to_string()).collect()));
        self
    }

    /// Make every evolution request for `metric` fail with a 500.
    pub fn failing(mut self, metric: &str) -> Self {
        self.failing.insert(metric.to_string());
        self
    }

    pub fn fail_versions(mut self) -> Self {
        self.fail_versions = true;
        self
    }

    /// Hold each evolution request until `n` requests have been in flight at
    /// once, or a second has passed.
    pub fn gate(mut self, n: usize) -> Self {
        self.gate = Some(n);
        self
    }

    /// Evolution requests served so far, as `(version, metric)`.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, metric: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .calls
            .lock()
            .iter()
            .filter(|(_, m)| m == metric)
            .map(|(v, _)| v.clone())
            .collect();
        versions.sort();
        versions
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn evolution_for(version: &VersionId, metric: &MetricName) -> Evolution {
        let base: f64 = version.build().parse().unwrap_or(1.0);
        Evolution::builder()
            .measure(metric.as_str())
            .kind(HistogramKind::Exponential)
            .buckets(vec![0.0, 1.0, 2.0, 5.0])
            .sample(Sample::new("2015-06-01", 3, vec![base, 40.0, 30.0, 20.0]).unwrap())
            .sample(Sample::new("2015-06-02", 4, vec![base, 30.0, 30.0, 20.0]).unwrap())
            .build()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TelemetryService for FakeService {
    async fn versions(&self) -> Result<Vec<VersionId>, TelemetryError> {
        if self.fail_versions {
            return Err(TelemetryError::Connection("refused".into()));
        }
        Ok(self.versions.iter().map(|(v, _)| v.clone()).collect())
    }

    async fn filter_options(&self, version: &VersionId) -> Result<FilterOptions, TelemetryError> {
        let metrics = self
            .versions
            .iter()
            .find(|(v, _)| v == version)
            .map(|(_, metrics)| metrics.clone())
            .unwrap_or_default();
        let mut options = BTreeMap::new();
        options.insert(METRIC_DIMENSION.to_string(), metrics);
        Ok(FilterOptions(options))
    }

    async fn evolution(
        &self,
        version: &VersionId,
        metric: &MetricName,
    ) -> Result<Evolution, TelemetryError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        self.calls
            .lock()
            .push((version.to_string(), metric.to_string()));

        // Let other lanes run between request and response
        tokio::task::yield_now().await;

        if let Some(n) = self.gate {
            let reached = async {
                while self.max_in_flight() < n {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            };
            let _ = tokio::time::timeout(Duration::from_secs(1), reached).await;
        }

        if self.failing.contains(metric.as_str()) {
            return Err(TelemetryError::Status {
                status: 500,
                url: format!("/evolution/{}/{}", version, metric),
            });
        }
        Ok(Self::evolution_for(version, metric))
    }
}
