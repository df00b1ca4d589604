//! Chart tables: the rows a regression chart is drawn from.

use histwatch_types::{format_number, RegressionRecord};

/// Column headers of every chart table.
pub const CHART_HEADER: [&str; 3] = ["Bucket", "Regression", "Reference"];

/// How regression and reference values are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueScale {
    /// Fractions shown as percentages (multiplied by 100).
    #[default]
    Percent,
    /// Values shown as stored.
    Raw,
}

impl ValueScale {
    pub fn factor(self) -> f64 {
        match self {
            ValueScale::Percent => 100.0,
            ValueScale::Raw => 1.0,
        }
    }

    /// Axis title for the value axis.
    pub fn label(self) -> &'static str {
        match self {
            ValueScale::Percent => "%",
            ValueScale::Raw => "value",
        }
    }
}

/// One bucket of a chart table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub label: String,
    pub regression: f64,
    pub reference: f64,
}

/// A header plus one row per bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTable {
    pub header: [&'static str; 3],
    pub rows: Vec<ChartRow>,
}

impl ChartTable {
    /// Regression series as `(bucket index, value)` points.
    pub fn regression_points(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i as f64, row.regression))
            .collect()
    }

    pub fn reference_points(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i as f64, row.reference))
            .collect()
    }

    /// X axis bounds; buckets are plotted at their index.
    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, self.rows.len().saturating_sub(1).max(1) as f64]
    }

    /// Y axis bounds covering both series with some headroom.
    pub fn y_bounds(&self) -> [f64; 2] {
        let values = self.rows.iter().flat_map(|r| [r.regression, r.reference]);
        let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if max - min <= f64::EPSILON {
            return [min, min + 1.0];
        }
        [min, max * 1.1]
    }
}

/// Build the chart table of `record`, scaling values by `scale`.
///
/// The record is expected to be aligned; extra entries in a longer
/// sequence are ignored.
pub fn chart_table(record: &RegressionRecord, scale: ValueScale) -> ChartTable {
    let factor = scale.factor();
    let rows = record
        .buckets
        .iter()
        .zip(&record.regression)
        .zip(&record.reference)
        .map(|((bucket, regression), reference)| ChartRow {
            label: format_number(*bucket),
            regression: regression * factor,
            reference: reference * factor,
        })
        .collect();

    ChartTable {
        header: CHART_HEADER,
        rows,
    }
}
