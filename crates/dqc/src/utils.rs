//! Shared utilities for the diagnostics engine.
//!
//! Column kind detection, value conversion for reports, and the small numeric
//! routines (rounding, quantiles, medians) used by several analyzers.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Logical kind of a column, decided once when a [`crate::Table`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point numbers
    Numeric,
    /// String or categorical text
    Text,
    /// Boolean type
    Boolean,
    /// Date or datetime types
    Datetime,
    /// Anything else (lists, structs, binary, ...)
    Other,
}

impl ColumnKind {
    /// Short lowercase tag used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Datetime => "datetime",
            ColumnKind::Other => "other",
        }
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type (NaN counts as missing).
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Get the kind of a DataType.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_datetime_dtype(dtype) {
        ColumnKind::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        ColumnKind::Boolean
    } else if matches!(
        dtype,
        DataType::String | DataType::Categorical(_, _) | DataType::Enum(_, _)
    ) {
        ColumnKind::Text
    } else {
        ColumnKind::Other
    }
}

// =============================================================================
// Value Conversion Utilities
// =============================================================================

/// Convert a finite float to JSON, mapping NaN and infinities to null.
pub fn float_to_json(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Convert a polars value to a JSON value for reports.
///
/// Nulls and NaN become JSON null; types without a natural JSON form are
/// rendered with their display representation.
pub fn any_value_to_json(value: &AnyValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::String(s) => Value::String((*s).to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::Float32(v) => float_to_json(f64::from(*v)),
        AnyValue::Float64(v) => float_to_json(*v),
        other => Value::String(format!("{}", other)),
    }
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Sort a slice of floats ascending; NaN values must already be removed.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// Quantile of already sorted data with linear interpolation between the two
/// nearest ranks. Returns `None` for empty input.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median of the given values, ignoring NaN. Returns `None` when nothing is left.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sort_floats(&mut clean);
    quantile_sorted(&clean, 0.5)
}

// =============================================================================
// Tests
// =============================================================================
