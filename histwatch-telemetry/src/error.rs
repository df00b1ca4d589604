//! Error types for the telemetry client.

use thiserror::Error;

/// Errors that can occur when querying the telemetry service.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Service answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    /// Failed to parse response.
    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Client could not be constructed.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl TelemetryError {
    /// Whether the transport should try the request again.
    ///
    /// Connection failures, timeouts, rate limiting and server errors are
    /// transient; client errors and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Connection(_) | TelemetryError::Timeout => true,
            TelemetryError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TelemetryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TelemetryError::Timeout
        } else if err.is_connect() {
            TelemetryError::Connection(err.to_string())
        } else {
            TelemetryError::Http(err.to_string())
        }
    }
}
