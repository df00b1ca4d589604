//! Export files on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use histwatch_types::MetricName;

use crate::ExportError;

/// Directory holding one `<metric>.json` per exported metric.
///
/// A file's presence marks its metric as done. Files are written to a
/// hidden temporary sibling and renamed into place, so a present file is
/// always complete.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, metric: &MetricName) -> PathBuf {
        self.dir.join(metric.file_name())
    }

    fn temp_path_for(&self, metric: &MetricName) -> PathBuf {
        self.dir.join(format!(".{}.tmp", metric.file_name()))
    }

    /// Create the output directory if missing.
    pub async fn ensure_dir(&self) -> Result<(), ExportError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ExportError::Write {
                path: self.dir.clone(),
                source,
            })
    }

    /// Whether an export for `metric` already exists.
    ///
    /// Only a missing file counts as "not exported"; any other I/O error is
    /// returned.
    pub async fn exists(&self, metric: &MetricName) -> Result<bool, ExportError> {
        let path = self.path_for(metric);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|source| ExportError::Stat { path, source })
    }

    /// Serialize `records` as indented JSON and store them for `metric`.
    pub async fn write<T: Serialize>(
        &self,
        metric: &MetricName,
        records: &[T],
    ) -> Result<PathBuf, ExportError> {
        let body = serde_json::to_vec_pretty(records)?;
        let tmp = self.temp_path_for(metric);
        let path = self.path_for(metric);

        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|source| ExportError::Write {
                path: tmp.clone(),
                source,
            })?;

        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(ExportError::Write { path, source });
        }

        debug!(path = %path.display(), bytes = body.len(), "stored export");
        Ok(path)
    }
}
