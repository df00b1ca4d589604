//! Sources of regression reports.
//!
//! The dashboard polls a [`DataSource`] on every refresh tick; a source
//! returns a report only when it has a new one.

mod file;
mod http;

pub use file::FileSource;
pub use http::{fetch_report, HttpSource};

use std::fmt::Debug;

use histwatch_types::RegressionReport;

/// Trait for receiving regression reports.
///
/// # Example
///
/// ```
/// use histwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("regressions.json");
/// if let Some(report) = source.poll() {
///     println!("{} dates", report.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for a new report.
    ///
    /// Returns `Some(report)` if new data is available, `None` otherwise.
    /// Must not block.
    fn poll(&mut self) -> Option<RegressionReport>;

    /// Human-readable description, shown in the status bar.
    fn description(&self) -> &str;

    /// Error from the most recent load attempt, if it failed.
    fn error(&self) -> Option<&str>;

    /// Ask the source to load again even if nothing changed.
    fn request_reload(&mut self) {}
}
