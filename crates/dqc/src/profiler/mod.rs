//! Column-level table statistics.
//!
//! This module provides:
//! - Schema inference with a sample value per column
//! - Missingness and cardinality reports
//! - Constant column detection
//! - Descriptive statistics for numeric columns

mod statistics;

use tracing::debug;

use crate::error::Result;
use crate::table::Table;
use crate::types::{CardinalityRecord, ColumnSchema, MissingnessRecord, NumericSummaryRecord};
use crate::utils::round_to;

use statistics::describe;

/// Number of leading rows searched for a schema sample value.
pub const SAMPLE_WINDOW: usize = 5;

/// Descriptive statistics over a [`Table`].
pub struct TableStats;

impl TableStats {
    /// Dtype, kind and a sample value for every column.
    ///
    /// The sample is the first non-missing value within the first
    /// [`SAMPLE_WINDOW`] rows of that column, or null when there is none.
    pub fn infer_schema(table: &Table) -> Result<Vec<ColumnSchema>> {
        let window = SAMPLE_WINDOW.min(table.height());
        let mut schema = Vec::with_capacity(table.width());

        for info in table.columns() {
            let mask = table.missing_mask(&info.name)?;
            let sample_value = match mask[..window].iter().position(|missing| !missing) {
                Some(row) => table.value_json(&info.name, row)?,
                None => serde_json::Value::Null,
            };

            schema.push(ColumnSchema {
                column: info.name.clone(),
                dtype: table.dtype_name(&info.name)?,
                kind: info.kind,
                sample_value,
            });
        }

        Ok(schema)
    }

    /// Missing count and percentage per column, highest percentage first.
    pub fn summarize_missing(table: &Table) -> Result<Vec<MissingnessRecord>> {
        let total = table.height();
        let mut records = Vec::with_capacity(table.width());

        for name in table.column_names() {
            let missing = table.missing_count(name)?;
            records.push(MissingnessRecord {
                column: name.to_string(),
                missing,
                missing_pct: percentage(missing, total),
            });
        }

        records.sort_by(|a, b| b.missing_pct.total_cmp(&a.missing_pct));
        debug!("Missingness summarized for {} columns", records.len());
        Ok(records)
    }

    /// Distinct non-missing counts per column, highest ratio first.
    ///
    /// `top_k` is how many rows a front-end shows; the report is not truncated.
    pub fn cardinality_report(table: &Table, top_k: usize) -> Result<Vec<CardinalityRecord>> {
        let denominator = table.height().max(1) as f64;
        let mut records = Vec::with_capacity(table.width());

        for name in table.column_names() {
            let nunique = table.distinct_count(name)?;
            records.push(CardinalityRecord {
                column: name.to_string(),
                nunique,
                unique_ratio: round_to(nunique as f64 / denominator, 4),
            });
        }

        records.sort_by(|a, b| b.unique_ratio.total_cmp(&a.unique_ratio));
        debug!(
            "Cardinality computed for {} columns (display top {})",
            records.len(),
            top_k
        );
        Ok(records)
    }

    /// Columns with at most one distinct non-missing value.
    pub fn constant_columns(table: &Table) -> Result<Vec<String>> {
        let mut constant = Vec::new();
        for name in table.column_names() {
            if table.distinct_count(name)? <= 1 {
                constant.push(name.to_string());
            }
        }
        Ok(constant)
    }

    /// Descriptive statistics for each numeric column.
    ///
    /// A table without numeric columns yields an empty summary.
    pub fn numeric_summary(table: &Table) -> Result<Vec<NumericSummaryRecord>> {
        let total = table.height();
        let mut records = Vec::new();

        for info in table.numeric_columns() {
            let values = table.present_numeric_values(&info.name)?;
            let missing = total - values.len();
            let stats = describe(&values);

            records.push(NumericSummaryRecord {
                column: info.name.clone(),
                count: stats.count,
                mean: stats.mean,
                std: stats.std,
                min: stats.min,
                q1: stats.q1,
                median: stats.median,
                q3: stats.q3,
                max: stats.max,
                missing,
                missing_pct: percentage(missing, total),
            });
        }

        debug!("Numeric summary computed for {} columns", records.len());
        Ok(records)
    }
}

/// `part / total * 100` rounded to two decimals; zero when `total` is zero.
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64 * 100.0, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ColumnKind;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn abc_table() -> Table {
        Table::new(
            df![
                "a" => [Some(1i64), None, Some(3)],
                "b" => [Some("x"), Some("y"), None],
                "c" => [5i64, 5, 5],
            ]
            .unwrap(),
        )
    }

    // ==================== infer_schema tests ====================

    #[test]
    fn test_infer_schema_samples_first_present_value() {
        let schema = TableStats::infer_schema(&abc_table()).unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema[0].column, "a");
        assert_eq!(schema[0].kind, ColumnKind::Numeric);
        assert_eq!(schema[0].sample_value, serde_json::json!(1));
        assert_eq!(schema[1].kind, ColumnKind::Text);
        assert_eq!(schema[1].sample_value, serde_json::json!("x"));
    }

    #[test]
    fn test_infer_schema_sample_window() {
        let late: Vec<Option<i64>> = vec![None, None, None, None, None, Some(7)];
        let early: Vec<Option<i64>> = vec![None, None, None, None, Some(3), Some(7)];
        let table = Table::new(df!["late" => late, "early" => early].unwrap());

        let schema = TableStats::infer_schema(&table).unwrap();
        assert_eq!(schema[0].sample_value, serde_json::Value::Null);
        assert_eq!(schema[1].sample_value, serde_json::json!(3));
    }

    #[test]
    fn test_infer_schema_empty_table() {
        let table = Table::new(df!["a" => Vec::<i64>::new()].unwrap());
        let schema = TableStats::infer_schema(&table).unwrap();
        assert_eq!(schema[0].sample_value, serde_json::Value::Null);
    }

    // ==================== summarize_missing tests ====================

    #[test]
    fn test_summarize_missing_percentages() {
        let missing = TableStats::summarize_missing(&abc_table()).unwrap();

        let columns: HashSet<_> = missing.iter().map(|r| r.column.as_str()).collect();
        assert_eq!(columns, HashSet::from(["a", "b", "c"]));

        let pct = |name: &str| {
            missing
                .iter()
                .find(|r| r.column == name)
                .map(|r| r.missing_pct)
                .unwrap()
        };
        assert_eq!(pct("a"), 33.33);
        assert_eq!(pct("b"), 33.33);
        assert_eq!(pct("c"), 0.0);
        assert_eq!(missing.last().unwrap().column, "c");
    }

    #[test]
    fn test_summarize_missing_sorted_descending() {
        let table = Table::new(
            df![
                "none" => [1i64, 2, 3, 4],
                "half" => [Some(1i64), None, Some(3), None],
                "most" => [None, None, None, Some(1i64)],
            ]
            .unwrap(),
        );
        let missing = TableStats::summarize_missing(&table).unwrap();
        let order: Vec<_> = missing.iter().map(|r| r.column.as_str()).collect();
        assert_eq!(order, vec!["most", "half", "none"]);
        assert_eq!(missing[0].missing, 3);
        assert_eq!(missing[0].missing_pct, 75.0);
    }

    #[test]
    fn test_summarize_missing_zero_rows() {
        let table = Table::new(df!["a" => Vec::<f64>::new()].unwrap());
        let missing = TableStats::summarize_missing(&table).unwrap();
        assert_eq!(missing[0].missing, 0);
        assert_eq!(missing[0].missing_pct, 0.0);
    }

    #[test]
    fn test_summarize_missing_counts_nan() {
        let table = Table::new(df!["f" => [1.0f64, f64::NAN, 2.0, f64::NAN]].unwrap());
        let missing = TableStats::summarize_missing(&table).unwrap();
        assert_eq!(missing[0].missing, 2);
        assert_eq!(missing[0].missing_pct, 50.0);
    }

    // ==================== cardinality_report tests ====================

    #[test]
    fn test_cardinality_report() {
        let table = Table::new(
            df![
                "id" => [1i64, 2, 3],
                "cat" => [Some("a"), Some("a"), None],
            ]
            .unwrap(),
        );
        let report = TableStats::cardinality_report(&table, 5).unwrap();

        assert_eq!(report[0].column, "id");
        assert_eq!(report[0].nunique, 3);
        assert_eq!(report[0].unique_ratio, 1.0);
        assert_eq!(report[1].nunique, 1);
        assert_eq!(report[1].unique_ratio, 0.3333);
    }

    #[test]
    fn test_cardinality_report_empty_table() {
        let table = Table::new(df!["a" => Vec::<i64>::new()].unwrap());
        let report = TableStats::cardinality_report(&table, 5).unwrap();
        assert_eq!(report[0].nunique, 0);
        assert_eq!(report[0].unique_ratio, 0.0);
    }

    // ==================== constant_columns tests ====================

    #[test]
    fn test_constant_columns() {
        assert_eq!(
            TableStats::constant_columns(&abc_table()).unwrap(),
            vec!["c".to_string()]
        );
    }

    #[test]
    fn test_signed_zero_is_one_value() {
        let table = Table::new(df!["z" => [0.0f64, -0.0, 0.0]].unwrap());

        assert_eq!(
            TableStats::constant_columns(&table).unwrap(),
            vec!["z".to_string()]
        );
        let report = TableStats::cardinality_report(&table, 5).unwrap();
        assert_eq!(report[0].nunique, 1);
        assert_eq!(report[0].unique_ratio, 0.3333);
    }

    #[test]
    fn test_nan_is_not_a_distinct_value() {
        let values = [Some(2.0f64), Some(f64::NAN), None, Some(2.0)];
        let table = Table::new(df!["f" => values].unwrap());
        assert_eq!(
            TableStats::constant_columns(&table).unwrap(),
            vec!["f".to_string()]
        );
    }

    #[test]
    fn test_constant_columns_all_missing() {
        let table = Table::new(
            df![
                "empty" => [None::<i64>, None, None],
                "single" => [Some("x"), None, Some("x")],
                "varied" => [Some("x"), Some("y"), None],
            ]
            .unwrap(),
        );
        assert_eq!(
            TableStats::constant_columns(&table).unwrap(),
            vec!["empty".to_string(), "single".to_string()]
        );
    }

    // ==================== numeric_summary tests ====================

    #[test]
    fn test_numeric_summary_only_numeric_columns() {
        let summary = TableStats::numeric_summary(&abc_table()).unwrap();
        let columns: Vec<_> = summary.iter().map(|r| r.column.as_str()).collect();
        assert_eq!(columns, vec!["a", "c"]);

        let a = &summary[0];
        assert_eq!(a.count, 2);
        assert_eq!(a.mean, Some(2.0));
        assert_eq!(a.min, Some(1.0));
        assert_eq!(a.max, Some(3.0));
        assert_eq!(a.missing, 1);
        assert_eq!(a.missing_pct, 33.33);

        let c = &summary[1];
        assert_eq!(c.std, Some(0.0));
    }

    #[test]
    fn test_numeric_summary_no_numeric_columns() {
        let table = Table::new(df!["s" => ["a", "b"]].unwrap());
        assert!(TableStats::numeric_summary(&table).unwrap().is_empty());
    }

    #[test]
    fn test_numeric_summary_all_missing_column() {
        let table = Table::new(df!["n" => [None::<f64>, None]].unwrap());
        let summary = TableStats::numeric_summary(&table).unwrap();
        assert_eq!(summary[0].count, 0);
        assert_eq!(summary[0].mean, None);
        assert_eq!(summary[0].missing_pct, 100.0);
    }
}
