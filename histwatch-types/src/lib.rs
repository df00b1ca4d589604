//! # histwatch-types
//!
//! Core record types shared by the histwatch exporter and dashboard.
//!
//! The telemetry aggregation service reports histogram *evolutions*: one
//! histogram per submission date, optionally split along filter dimensions
//! such as OS or channel. The exporter flattens those trees into
//! [`EvolutionRecord`]s, one per dated sample of each leaf filter path. The
//! dashboard reads a [`RegressionReport`] produced by an offline analysis
//! step.
//!
//! ## Example
//!
//! ```rust
//! use histwatch_types::{Evolution, HistogramKind, MetricName, Sample};
//!
//! let metric = MetricName::new("GC_MS").unwrap();
//! let evolution = Evolution::builder()
//!     .measure("GC_MS")
//!     .kind(HistogramKind::Exponential)
//!     .buckets(vec![0.0, 1.0, 2.0, 5.0])
//!     .sample(Sample::new("2015-06-01", 10, vec![10.0, 40.0, 30.0, 20.0]).unwrap())
//!     .build();
//!
//! let records = evolution.flatten(&metric).unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].date, "2015-06-01T00:00:00.000Z");
//! ```

mod date;
mod error;
mod evolution;
mod histogram;
mod metric;
mod number;
mod regression;
mod version;

pub use date::{format_timestamp, parse_date};
pub use error::TypeError;
pub use evolution::*;
pub use histogram::*;
pub use metric::MetricName;
pub use number::format_number;
pub use regression::*;
pub use version::{select_recent, VersionId};

/// Channel prefix used to pick the builds that get exported.
pub const NIGHTLY_PREFIX: &str = "nightly";

/// Number of most recent builds kept by [`select_recent`] in the default setup.
pub const DEFAULT_VERSION_COUNT: usize = 3;
