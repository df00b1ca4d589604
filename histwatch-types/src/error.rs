//! Error types for record parsing and validation.

use thiserror::Error;

/// Errors raised when a record does not have the expected shape.
#[derive(Debug, Error)]
pub enum TypeError {
    /// Version identifier is not of the form `channel/build`.
    #[error("invalid version id '{0}': expected channel/build")]
    InvalidVersion(String),

    /// Metric name cannot be used as a file stem.
    #[error("invalid metric name '{0}'")]
    InvalidMetric(String),

    /// Date string could not be parsed.
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    /// Parallel sequences have different lengths.
    #[error("{context}: {left} has {left_len} entries but {right} has {right_len}")]
    Misaligned {
        context: String,
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    /// A field required to build a record is absent at every level of the tree.
    #[error("missing '{field}' for filter path [{path}]")]
    MissingField { field: &'static str, path: String },

    /// Document is not valid JSON or does not match the schema.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}
