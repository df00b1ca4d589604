//! The export run: discovery, lanes, per-metric export.

use std::sync::Arc;

use futures_util::future::{join_all, try_join_all};
use tracing::{error, info};

use histwatch_telemetry::{TelemetryClient, TelemetryService};
use histwatch_types::{EvolutionRecord, MetricName};

use crate::discovery::{discover, MetricCatalog};
use crate::{ExportConfig, ExportError, OutputStore, Worklist};

/// Outcome of one metric's export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricOutcome {
    /// A file was written with this many records.
    Written(usize),
    /// The file already existed.
    Skipped,
}

/// Metric names grouped by how their export ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: Vec<MetricName>,
    pub skipped: Vec<MetricName>,
    pub failed: Vec<MetricName>,
}

impl ExportSummary {
    fn merge(&mut self, other: ExportSummary) {
        self.written.extend(other.written);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    fn sort(&mut self) {
        self.written.sort();
        self.skipped.sort();
        self.failed.sort();
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len() + self.failed.len()
    }
}

/// Exports every discovered metric to an [`OutputStore`].
pub struct Exporter<S: ?Sized> {
    service: Arc<S>,
    store: OutputStore,
    channel_prefix: String,
    version_count: usize,
    lanes: usize,
}

impl<S> Exporter<S>
where
    S: TelemetryService + ?Sized,
{
    pub fn new(service: Arc<S>, store: OutputStore) -> Self {
        let defaults = ExportConfig::default();
        Self {
            service,
            store,
            channel_prefix: defaults.channel_prefix,
            version_count: defaults.version_count,
            lanes: defaults.lanes,
        }
    }

    pub fn channel_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.channel_prefix = prefix.into();
        self
    }

    pub fn version_count(mut self, count: usize) -> Self {
        self.version_count = count;
        self
    }

    /// Number of metrics exported concurrently (at least one).
    pub fn lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes.max(1);
        self
    }

    /// Discover metrics and export each one that has no file yet.
    ///
    /// Only discovery and output directory failures abort the run; a metric
    /// whose export fails is logged and reported in the summary.
    pub async fn run(&self) -> Result<ExportSummary, ExportError> {
        let catalog = discover(&*self.service, &self.channel_prefix, self.version_count).await?;
        self.store.ensure_dir().await?;
        Ok(self.export_catalog(&catalog).await)
    }

    /// Export every metric of `catalog` using the configured number of lanes.
    pub async fn export_catalog(&self, catalog: &MetricCatalog) -> ExportSummary {
        let worklist = Worklist::new(catalog.measures.iter().cloned());
        info!(
            metrics = worklist.len(),
            lanes = self.lanes,
            dir = %self.store.dir().display(),
            "starting export"
        );

        let lanes = (0..self.lanes).map(|lane| self.lane(lane, catalog, worklist.clone()));
        let mut summary = ExportSummary::default();
        for partial in join_all(lanes).await {
            summary.merge(partial);
        }
        summary.sort();

        info!(
            written = summary.written.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "export finished"
        );
        if !summary.failed.is_empty() {
            let failed: Vec<&str> = summary.failed.iter().map(MetricName::as_str).collect();
            error!(?failed, "some metrics were not exported");
        }
        summary
    }

    async fn lane(&self, lane: usize, catalog: &MetricCatalog, worklist: Worklist) -> ExportSummary {
        let mut summary = ExportSummary::default();

        while let Some(metric) = worklist.pop() {
            match self.export_metric(catalog, &metric).await {
                Ok(MetricOutcome::Written(_)) => summary.written.push(metric),
                Ok(MetricOutcome::Skipped) => summary.skipped.push(metric),
                Err(e) => {
                    error!(lane, metric = %metric, error = %e, "export failed");
                    summary.failed.push(metric);
                }
            }
        }
        summary
    }

    /// Fetch, flatten and store one metric.
    pub async fn export_metric(
        &self,
        catalog: &MetricCatalog,
        metric: &MetricName,
    ) -> Result<MetricOutcome, ExportError> {
        if self.store.exists(metric).await? {
            info!(metric = %metric, "skipping");
            return Ok(MetricOutcome::Skipped);
        }

        let versions = catalog.versions_with(metric);
        info!(
            metric = %metric,
            versions = ?versions.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "downloading"
        );

        let evolutions = try_join_all(versions.iter().map(|v| self.service.evolution(v, metric)))
            .await
            .map_err(|source| ExportError::Fetch {
                metric: metric.clone(),
                source,
            })?;

        let mut records: Vec<EvolutionRecord> = Vec::new();
        for evolution in &evolutions {
            let flattened = evolution
                .flatten(metric)
                .map_err(|source| ExportError::Flatten {
                    metric: metric.clone(),
                    source,
                })?;
            records.extend(flattened);
        }

        let path = self.store.write(metric, &records).await?;
        info!(
            metric = %metric,
            records = records.len(),
            path = %path.display(),
            "wrote export"
        );
        Ok(MetricOutcome::Written(records.len()))
    }
}

/// Build a client and exporter from `config` and run one export.
pub async fn run_export(config: &ExportConfig) -> Result<ExportSummary, ExportError> {
    config.validate()?;

    let client = TelemetryClient::builder()
        .endpoint(config.endpoint.clone())
        .timeout(config.timeout())
        .max_retries(config.max_retries)
        .build()
        .map_err(|e| ExportError::Config(e.to_string()))?;

    Exporter::new(Arc::new(client), OutputStore::new(&config.output_dir))
        .channel_prefix(config.channel_prefix.clone())
        .version_count(config.version_count)
        .lanes(config.lanes)
        .run()
        .await
}
