//! Dashboard data: regression reports grouped for display.
//!
//! ```text
//! RegressionReport (JSON, date -> metric -> record)
//!        │
//!        ▼
//! DashboardData::from_report()
//!        │
//!        └──▶ DateSection (newest first) ──▶ RegressionChart (per metric)
//!                                                  │
//!                                                  ▼
//!                                           chart_table(scale)
//! ```

pub mod chart;

pub use chart::{chart_table, ChartRow, ChartTable, ValueScale, CHART_HEADER};

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use histwatch_types::{RegressionRecord, RegressionReport};

/// A metric's regression on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionChart {
    pub metric: String,
    pub record: RegressionRecord,
}

impl RegressionChart {
    pub fn description(&self) -> &str {
        &self.record.description
    }

    pub fn table(&self, scale: ValueScale) -> ChartTable {
        chart_table(&self.record, scale)
    }
}

/// All charts of one date, in metric name order.
#[derive(Debug, Clone, PartialEq)]
pub struct DateSection {
    pub date: NaiveDate,
    pub charts: Vec<RegressionChart>,
}

impl DateSection {
    /// Anchor used to link to this section, `YYYY-MM-DD`.
    pub fn anchor(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Grouped report ready for rendering.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub sections: Vec<DateSection>,
    pub last_updated: Instant,
}

impl DashboardData {
    pub fn from_report(report: &RegressionReport) -> Self {
        Self {
            sections: group_by_date(report),
            last_updated: Instant::now(),
        }
    }

    /// Read and group a report file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let report = RegressionReport::from_json(&content)
            .with_context(|| format!("invalid regression report {}", path.display()))?;
        Ok(Self::from_report(&report))
    }

    /// Index of the section for `date`.
    pub fn find_date(&self, date: NaiveDate) -> Option<usize> {
        self.sections.iter().position(|s| s.date == date)
    }

    pub fn chart_count(&self) -> usize {
        self.sections.iter().map(|s| s.charts.len()).sum()
    }
}

/// One section per date, newest first, each with one chart per metric.
pub fn group_by_date(report: &RegressionReport) -> Vec<DateSection> {
    report
        .iter_newest_first()
        .map(|(date, metrics)| DateSection {
            date,
            charts: metrics
                .iter()
                .map(|(metric, record)| RegressionChart {
                    metric: metric.clone(),
                    record: record.clone(),
                })
                .collect(),
        })
        .collect()
}
