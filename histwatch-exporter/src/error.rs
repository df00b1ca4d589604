//! Error types for the export pipeline.

use std::path::PathBuf;

use histwatch_telemetry::TelemetryError;
use histwatch_types::{MetricName, TypeError};
use thiserror::Error;

/// Errors raised while exporting histogram evolutions.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Version or metric discovery failed; the run cannot continue.
    #[error("discovery failed: {0}")]
    Discovery(#[source] TelemetryError),

    /// An evolution request for one metric failed.
    #[error("failed to fetch {metric}: {source}")]
    Fetch {
        metric: MetricName,
        #[source]
        source: TelemetryError,
    },

    /// An evolution could not be flattened into records.
    #[error("invalid evolution for {metric}: {source}")]
    Flatten {
        metric: MetricName,
        #[source]
        source: TypeError,
    },

    /// Writing an export file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Checking for an existing export failed.
    #[error("failed to check {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Records could not be serialized.
    #[error("failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),

    /// Settings are missing or out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<::config::ConfigError> for ExportError {
    fn from(err: ::config::ConfigError) -> Self {
        ExportError::Config(err.to_string())
    }
}
