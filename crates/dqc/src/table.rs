//! Column-oriented table the analyzers operate on.
//!
//! [`Table`] wraps a polars [`DataFrame`] and records the [`ColumnKind`] of
//! every column once, at construction. Analyzers dispatch on that tag instead
//! of re-probing dtypes, and read values through the typed accessors here so
//! that "missing" means the same thing everywhere: a null, or NaN in a float
//! column.
//!
//! A `Table` is read-only. Accessors return owned working copies, so no
//! analyzer can mutate the caller's data.

use polars::prelude::*;

use crate::error::{DqcError, Result};
use crate::utils::{ColumnKind, any_value_to_json, column_kind, is_float_dtype};

/// Name and kind of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
}

/// An immutable table with per-column kinds.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    columns: Vec<ColumnInfo>,
}

static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// Wrap a DataFrame, deciding every column's kind.
    pub fn new(df: DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                kind: column_kind(col.dtype()),
            })
            .collect();

        Self { df, columns }
    }

    /// A table with no rows and no columns.
    pub fn empty() -> Self {
        Self::new(DataFrame::empty())
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    /// Columns in table order.
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Numeric columns in table order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Text columns in table order.
    pub fn text_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns_of_kind(ColumnKind::Text)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(move |c| c.kind == kind)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The wrapped DataFrame.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    fn series(&self, name: &str) -> Result<&Series> {
        let col = self
            .df
            .column(name)
            .map_err(|_| DqcError::ColumnNotFound(name.to_string()))?;
        Ok(col.as_materialized_series())
    }

    /// Physical dtype name of a column (e.g. `i64`, `str`).
    pub fn dtype_name(&self, name: &str) -> Result<String> {
        Ok(format!("{}", self.series(name)?.dtype()))
    }

    /// Per-row missing flags: null, or NaN for float columns.
    pub fn missing_mask(&self, name: &str) -> Result<Vec<bool>> {
        let series = self.series(name)?;
        let nulls = series.is_null();
        let mut mask: Vec<bool> = (0..series.len())
            .map(|i| nulls.get(i).unwrap_or(true))
            .collect();

        if is_float_dtype(series.dtype()) {
            let floats = series.cast(&DataType::Float64)?;
            for (missing, value) in mask.iter_mut().zip(floats.f64()?.into_iter()) {
                if value.is_some_and(f64::is_nan) {
                    *missing = true;
                }
            }
        }

        Ok(mask)
    }

    /// Number of missing entries in a column.
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.missing_mask(name)?.into_iter().filter(|m| *m).count())
    }

    /// A column with NaN turned into null, so polars' own null handling
    /// covers every missing entry.
    pub fn nulled_column(&self, name: &str) -> Result<Series> {
        let series = self.series(name)?;
        if !is_float_dtype(series.dtype()) {
            return Ok(series.clone());
        }

        let floats = series.cast(&DataType::Float64)?;
        let nulled: Float64Chunked = floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Ok(nulled.with_name(series.name().clone()).into_series())
    }

    /// Number of distinct non-missing values in a column.
    ///
    /// Floats compare by value, so `-0.0` and `0.0` are one value.
    pub fn distinct_count(&self, name: &str) -> Result<usize> {
        Ok(self.nulled_column(name)?.drop_nulls().n_unique()?)
    }

    /// Values of a numeric column as `f64`; missing entries (null or NaN) are
    /// `None`, infinities are kept.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let info = self
            .column(name)
            .ok_or_else(|| DqcError::ColumnNotFound(name.to_string()))?;
        if info.kind != ColumnKind::Numeric {
            return Err(DqcError::InvalidInput(format!(
                "column '{}' is {}, not numeric",
                name,
                info.kind.as_str()
            )));
        }

        let floats = self.series(name)?.cast(&DataType::Float64)?;
        Ok(floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Non-missing finite-or-infinite values of a numeric column.
    pub fn present_numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.numeric_values(name)?.into_iter().flatten().collect())
    }

    /// Values of any column coerced to text; missing entries are `None`.
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self.series(name)?;
        let mask = self.missing_mask(name)?;

        let texts: Vec<Option<String>> = match series.cast(&DataType::String) {
            Ok(cast) => cast
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect(),
            // Nested types have no string cast; fall back to display form.
            Err(_) => (0..series.len())
                .map(|i| series.get(i).ok().map(|v| format!("{}", v)))
                .collect(),
        };

        Ok(texts
            .into_iter()
            .zip(mask)
            .map(|(text, missing)| if missing { None } else { text })
            .collect())
    }

    /// A single cell as JSON (missing ⇒ null).
    pub fn value_json(&self, name: &str, row: usize) -> Result<serde_json::Value> {
        let value = self.series(name)?.get(row)?;
        Ok(any_value_to_json(&value))
    }
}

impl From<DataFrame> for Table {
    fn from(df: DataFrame) -> Self {
        Table::new(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(
            df![
                "a" => [Some(1i64), None, Some(3)],
                "b" => [Some("x"), Some("y"), None],
                "c" => [Some(1.5f64), Some(f64::NAN), Some(f64::INFINITY)],
                "d" => [true, false, true],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_kinds_are_decided_once() {
        let table = sample_table();
        let kinds: Vec<_> = table.columns().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Numeric,
                ColumnKind::Text,
                ColumnKind::Numeric,
                ColumnKind::Boolean
            ]
        );
        assert_eq!(table.numeric_columns().count(), 2);
        assert_eq!(table.text_columns().count(), 1);
    }

    #[test]
    fn test_missing_mask_counts_nan() {
        let table = sample_table();
        assert_eq!(table.missing_mask("a").unwrap(), vec![false, true, false]);
        assert_eq!(table.missing_mask("c").unwrap(), vec![false, true, false]);
        assert_eq!(table.missing_count("b").unwrap(), 1);
    }

    #[test]
    fn test_numeric_values_keep_infinity() {
        let table = sample_table();
        let values = table.numeric_values("c").unwrap();
        assert_eq!(values[0], Some(1.5));
        assert_eq!(values[1], None);
        assert_eq!(values[2], Some(f64::INFINITY));
    }

    #[test]
    fn test_numeric_values_rejects_text_column() {
        let table = sample_table();
        let err = table.numeric_values("b").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_text_values_coerce_and_skip_missing() {
        let table = sample_table();
        assert_eq!(
            table.text_values("b").unwrap(),
            vec![Some("x".to_string()), Some("y".to_string()), None]
        );
        let ints = table.text_values("a").unwrap();
        assert_eq!(ints[0].as_deref(), Some("1"));
        assert_eq!(ints[1], None);
    }

    #[test]
    fn test_nulled_column_turns_nan_into_null() {
        let table = sample_table();
        let nulled = table.nulled_column("c").unwrap();
        assert_eq!(nulled.name().as_str(), "c");
        assert_eq!(nulled.null_count(), 1);

        let ints = table.nulled_column("a").unwrap();
        assert_eq!(ints.dtype(), &DataType::Int64);
        assert_eq!(ints.null_count(), 1);
    }

    #[test]
    fn test_distinct_count_skips_missing() {
        let table = sample_table();
        assert_eq!(table.distinct_count("a").unwrap(), 2);
        assert_eq!(table.distinct_count("c").unwrap(), 2);
    }

    #[test]
    fn test_unknown_column() {
        let table = sample_table();
        assert!(matches!(
            table.missing_mask("zzz").unwrap_err(),
            DqcError::ColumnNotFound(_)
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty();
        assert_eq!(table.height(), 0);
        assert_eq!(table.width(), 0);
        assert!(table.is_empty());
    }
}
