//! The telemetry service seam.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use histwatch_types::{Evolution, MetricName, VersionId};

use crate::TelemetryError;

/// Filter dimension listing the available metrics.
pub const METRIC_DIMENSION: &str = "metric";

/// Options available for each filter dimension of one build version.
///
/// The `metric` dimension lists the histograms recorded for that build;
/// other dimensions (`os`, `application`, ...) list the values evolutions
/// can be split along.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterOptions(pub BTreeMap<String, Vec<String>>);

impl FilterOptions {
    /// Raw metric names, as reported.
    pub fn metrics(&self) -> &[String] {
        self.0
            .get(METRIC_DIMENSION)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn dimension(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }
}

/// Operations the exporter needs from the telemetry aggregation service.
#[async_trait]
pub trait TelemetryService: Send + Sync {
    /// All known build versions, as `channel/build` identifiers.
    async fn versions(&self) -> Result<Vec<VersionId>, TelemetryError>;

    /// Filter options (including the metric list) of one build version.
    async fn filter_options(&self, version: &VersionId) -> Result<FilterOptions, TelemetryError>;

    /// Aggregated evolution of `metric` over the builds of `version`.
    async fn evolution(
        &self,
        version: &VersionId,
        metric: &MetricName,
    ) -> Result<Evolution, TelemetryError>;
}
