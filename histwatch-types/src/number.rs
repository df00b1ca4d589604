//! JSON number helpers.
//!
//! Bucket bounds and counts are carried as `f64` but are integral almost
//! everywhere; writing them as integers keeps exports compact and matches
//! what other consumers of the files expect.

use serde::ser::SerializeSeq;
use serde::Serializer;

/// Largest magnitude written as an integer (exactly representable in f64).
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

fn is_integral(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT
}

pub(crate) fn serialize_numbers<S>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for &v in values {
        if is_integral(v) {
            seq.serialize_element(&(v as i64))?;
        } else {
            seq.serialize_element(&v)?;
        }
    }
    seq.end()
}

pub(crate) fn serialize_opt_number<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match *value {
        Some(v) if is_integral(v) => serializer.serialize_i64(v as i64),
        Some(v) => serializer.serialize_f64(v),
        None => serializer.serialize_none(),
    }
}

/// Render a number the way a bucket label is shown: `0`, `1.5`, `1000`.
pub fn format_number(v: f64) -> String {
    if is_integral(v) {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
