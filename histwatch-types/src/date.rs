//! Date parsing shared by evolution samples and regression reports.

use chrono::NaiveDate;

use crate::TypeError;

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, the compact `YYYYMMDD` form used by the aggregation
/// service, and longer ISO timestamps whose first ten characters are a date
/// (`2015-06-01T00:00:00.000Z`). The time part of a timestamp is dropped.
pub fn parse_date(s: &str) -> Result<NaiveDate, TypeError> {
    let s = s.trim();
    let invalid = || TypeError::InvalidDate(s.to_string());

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|_| invalid());
    }

    let head = s.get(..10).ok_or_else(invalid)?;
    if s.len() > 10 && !s[10..].starts_with(['T', ' ']) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| invalid())
}

/// Format a date as a UTC midnight timestamp, the form written to exports.
pub fn format_timestamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00.000Z").to_string()
}
