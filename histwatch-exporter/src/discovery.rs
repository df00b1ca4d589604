//! Version and metric discovery.

use std::collections::BTreeSet;

use futures_util::future::try_join_all;
use tracing::{debug, info, warn};

use histwatch_telemetry::TelemetryService;
use histwatch_types::{select_recent, MetricName, VersionId};

use crate::ExportError;

/// Which metrics each selected version records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricCatalog {
    /// Selected versions, ascending.
    pub versions: Vec<VersionId>,
    /// Metric set per version, index-aligned with `versions`.
    pub per_version: Vec<BTreeSet<MetricName>>,
    /// Union of all per-version sets.
    pub measures: BTreeSet<MetricName>,
}

impl MetricCatalog {
    pub fn from_parts(versions: Vec<VersionId>, per_version: Vec<BTreeSet<MetricName>>) -> Self {
        debug_assert_eq!(versions.len(), per_version.len());
        let measures = per_version.iter().flatten().cloned().collect();
        Self {
            versions,
            per_version,
            measures,
        }
    }

    /// Versions recording `metric`, in catalog order.
    pub fn versions_with(&self, metric: &MetricName) -> Vec<VersionId> {
        self.versions
            .iter()
            .zip(&self.per_version)
            .filter(|(_, metrics)| metrics.contains(metric))
            .map(|(version, _)| version.clone())
            .collect()
    }
}

/// Select the `count` most recent `prefix` versions and collect their metrics.
///
/// Filter options for the selected versions are requested concurrently. Any
/// service failure aborts discovery.
pub async fn discover<S>(service: &S, prefix: &str, count: usize) -> Result<MetricCatalog, ExportError>
where
    S: TelemetryService + ?Sized,
{
    let all = service.versions().await.map_err(ExportError::Discovery)?;
    let total = all.len();
    let versions = select_recent(all, prefix, count);
    info!(
        total,
        selected = ?versions.iter().map(VersionId::as_str).collect::<Vec<_>>(),
        "selected versions"
    );

    let options = try_join_all(versions.iter().map(|v| service.filter_options(v)))
        .await
        .map_err(ExportError::Discovery)?;

    let per_version = versions
        .iter()
        .zip(options)
        .map(|(version, options)| {
            let metrics: BTreeSet<MetricName> = options
                .metrics()
                .iter()
                .filter_map(|raw| match MetricName::new(raw.as_str()) {
                    Ok(name) => Some(name),
                    Err(e) => {
                        warn!(error = %e, version = %version, "dropping metric");
                        None
                    }
                })
                .collect();
            debug!(version = %version, metrics = metrics.len(), "discovered metrics");
            metrics
        })
        .collect();

    let catalog = MetricCatalog::from_parts(versions, per_version);
    info!(
        versions = catalog.versions.len(),
        metrics = catalog.measures.len(),
        "discovery complete"
    );
    Ok(catalog)
}
