//! # histwatch
//!
//! A terminal dashboard for telemetry histogram regressions.
//!
//! A regression report maps build dates to the metrics whose distribution
//! shifted on that date. The dashboard groups the report by date, newest
//! first, and draws one chart per metric comparing the regressed
//! distribution with its reference.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐          │
//! │  │  app    │───▶│   data   │───▶│   ui    │──▶ TUI   │
//! │  │ (state) │    │ (group)  │    │ (charts)│          │
//! │  └────┬────┘    └────┬─────┘    └─────────┘          │
//! │       │              └──────────▶ export ──▶ JSON    │
//! │       ▼                                              │
//! │  ┌─────────┐                                         │
//! │  │ source  │◀── FileSource | HttpSource              │
//! │  └─────────┘                                         │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Watch a local report
//! histwatch --file regressions.json
//!
//! # Fetch the report from a server and open a date
//! histwatch --url https://example.org/regressions.json --date 2015-06-02
//!
//! # Write the chart tables and exit
//! histwatch --file regressions.json --export charts.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use histwatch::{App, FileSource, ValueScale};
//!
//! let source = Box::new(FileSource::new("regressions.json"));
//! let app = App::new(source, ValueScale::Percent);
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod export;
pub mod source;
pub mod ui;

pub use app::App;
pub use data::{
    chart_table, group_by_date, ChartRow, ChartTable, DashboardData, DateSection, RegressionChart,
    ValueScale,
};
pub use export::{export_sections, write_export};
pub use source::{fetch_report, DataSource, FileSource, HttpSource};
