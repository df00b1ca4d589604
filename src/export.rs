//! Non-interactive export of chart tables.
//!
//! Output shape:
//!
//! ```json
//! [
//!   {
//!     "date": "2015-06-02",
//!     "charts": [
//!       {"metric": "GC_MS", "description": "...", "rows": [["0", 40.0, 50.0]]}
//!     ]
//!   }
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::{DashboardData, ValueScale};

#[derive(Debug, Serialize, PartialEq)]
pub struct ExportedSection {
    pub date: String,
    pub charts: Vec<ExportedChart>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ExportedChart {
    pub metric: String,
    pub description: String,
    /// `[bucket label, regression, reference]` per bucket.
    pub rows: Vec<(String, f64, f64)>,
}

/// Chart tables of every section, newest date first.
pub fn export_sections(data: &DashboardData, scale: ValueScale) -> Vec<ExportedSection> {
    data.sections
        .iter()
        .map(|section| ExportedSection {
            date: section.anchor(),
            charts: section
                .charts
                .iter()
                .map(|chart| ExportedChart {
                    metric: chart.metric.clone(),
                    description: chart.description().to_string(),
                    rows: chart
                        .table(scale)
                        .rows
                        .into_iter()
                        .map(|row| (row.label, row.regression, row.reference))
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Write the export of `data` to `path` as pretty JSON.
pub fn write_export(path: &Path, data: &DashboardData, scale: ValueScale) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_sections(data, scale))?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use histwatch_types::RegressionReport;

    fn data() -> DashboardData {
        let report = RegressionReport::from_json(
            r#"{
                "2015-06-01": {"GC_MS": {"buckets": [0, 1.5], "regression": [0.25, 0.75], "reference": [0.5, 0.5], "description": "gc"}},
                "2015-06-02": {"A": {"buckets": [0], "regression": [1], "reference": [1]}}
            }"#,
        )
        .unwrap();
        DashboardData::from_report(&report)
    }

    #[test]
    fn test_export_sections() {
        let sections = export_sections(&data(), ValueScale::Percent);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].date, "2015-06-02");

        let gc = &sections[1].charts[0];
        assert_eq!(gc.metric, "GC_MS");
        assert_eq!(gc.description, "gc");
        assert_eq!(
            gc.rows,
            vec![("0".to_string(), 25.0, 50.0), ("1.5".to_string(), 75.0, 50.0)]
        );
    }

    #[test]
    fn test_write_export_shape() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        write_export(&path, &data(), ValueScale::Raw).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let row = &value[1]["charts"][0]["rows"][1];
        assert_eq!(row[0], "1.5");
        assert_eq!(row[1], 0.75);
        assert_eq!(row[2], 0.5);
    }
}
