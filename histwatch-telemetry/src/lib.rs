//! # histwatch-telemetry
//!
//! Client for the telemetry aggregation service.
//!
//! The exporter talks to the service through the [`TelemetryService`] trait;
//! [`TelemetryClient`] is the HTTP implementation. Keeping the trait as the
//! seam lets the export pipeline run against in-memory services in tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use histwatch_telemetry::{TelemetryClient, TelemetryService};
//! use histwatch_types::{MetricName, VersionId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelemetryClient::builder()
//!         .endpoint("http://localhost:8080")
//!         .build()?;
//!
//!     let version = VersionId::parse("nightly/41")?;
//!     let options = client.filter_options(&version).await?;
//!     println!("{} metrics in {}", options.metrics().len(), version);
//!
//!     let evolution = client.evolution(&version, &MetricName::new("GC_MS")?).await?;
//!     println!("{} samples", evolution.leaf_sample_count());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod service;

pub use client::{TelemetryClient, TelemetryClientBuilder, DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES};
pub use error::TelemetryError;
pub use service::{FilterOptions, TelemetryService, METRIC_DIMENSION};

// Re-export types for convenience
pub use histwatch_types::{Evolution, MetricName, VersionId};
