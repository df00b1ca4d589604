//! # histwatch-exporter
//!
//! Batch export of telemetry histogram evolutions.
//!
//! A run selects the most recent nightly builds, collects the metrics they
//! record, and writes one JSON file per metric holding the flattened
//! evolution records of every build that has it. Metrics whose file already
//! exists are skipped, so an interrupted run can simply be restarted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use histwatch_exporter::{run_export, ExportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::load(None)?;
//!     let summary = run_export(&config).await?;
//!     println!("{} written, {} skipped", summary.written.len(), summary.skipped.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod store;
pub mod worklist;

#[cfg(test)]
mod testing;

pub use config::ExportConfig;
pub use discovery::{discover, MetricCatalog};
pub use error::ExportError;
pub use logging::init_logging;
pub use pipeline::{run_export, ExportSummary, Exporter, MetricOutcome};
pub use store::OutputStore;
pub use worklist::Worklist;
