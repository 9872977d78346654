//! Outlier detection over numeric columns.
//!
//! Two independent detectors share one preparation step:
//! - [`OutlierDetector::iqr_outliers`] flags values outside the IQR fences
//! - [`OutlierDetector::isolation_forest_outliers`] scores rows with an
//!   isolation forest and flags the least normal ones
//!
//! Both return [`OutlierResult::empty`] for an empty table or a table without
//! numeric columns.

mod iqr;
mod isolation_forest;

use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::table::Table;
use crate::types::OutlierResult;
use crate::utils::median;

pub use iqr::iqr_bounds;
pub use isolation_forest::IsolationForest;

/// Numeric columns with missing and infinite values replaced by the column
/// median. Stored column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub rows: usize,
}

impl NumericMatrix {
    /// Whether there is anything to score.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows == 0
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Value of `feature` in `row`.
    #[inline]
    pub fn get(&self, row: usize, feature: usize) -> f64 {
        self.values[feature][row]
    }
}

/// Build the numeric working copy used by both detectors.
///
/// Missing and infinite entries take the median of the column's finite
/// values. Columns with no finite value have no median and are dropped.
pub fn prepare_numeric(table: &Table) -> Result<NumericMatrix> {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for info in table.numeric_columns() {
        let raw = table.numeric_values(&info.name)?;
        let finite: Vec<f64> = raw.iter().flatten().copied().filter(|v| v.is_finite()).collect();

        let Some(fill) = median(&finite) else {
            warn!(
                "Column '{}' has no finite values, skipping it for outlier detection",
                info.name
            );
            continue;
        };

        let filled = raw
            .into_iter()
            .map(|v| match v {
                Some(x) if x.is_finite() => x,
                _ => fill,
            })
            .collect();

        columns.push(info.name.clone());
        values.push(filled);
    }

    Ok(NumericMatrix {
        columns,
        values,
        rows: table.height(),
    })
}

/// Entry points for both outlier detectors.
pub struct OutlierDetector;

impl OutlierDetector {
    /// Flag rows where any numeric column falls outside
    /// `[Q1 - k*IQR, Q3 + k*IQR]`.
    pub fn iqr_outliers(table: &Table, multiplier: f64) -> Result<OutlierResult> {
        let matrix = prepare_numeric(table)?;
        if matrix.is_empty() {
            debug!("IQR outliers: nothing to score");
            return Ok(OutlierResult::empty());
        }

        let flags = iqr::flag_rows(&matrix, multiplier);
        let result = OutlierResult::from_flags(flags);
        debug!(
            "IQR outliers: {} of {} rows flagged (k = {})",
            result.n_outliers, matrix.rows, multiplier
        );
        Ok(result)
    }

    /// Fit an isolation forest on the table and flag rows whose decision
    /// score falls below the contamination threshold.
    pub fn isolation_forest_outliers(
        table: &Table,
        config: &AnalysisConfig,
    ) -> Result<OutlierResult> {
        let matrix = prepare_numeric(table)?;
        if matrix.is_empty() {
            debug!("Isolation forest: nothing to score");
            return Ok(OutlierResult::empty());
        }

        let forest = IsolationForest::fit(
            &matrix,
            config.n_estimators,
            config.effective_contamination(),
            config.random_seed,
        );
        let scores = forest.decision_function(&matrix);
        let flags: Vec<bool> = scores.iter().map(|s| *s < 0.0).collect();

        let result = OutlierResult::from_flags(flags).with_scores(scores);
        debug!(
            "Isolation forest: {} of {} rows flagged ({} trees)",
            result.n_outliers,
            matrix.rows,
            forest.n_trees()
        );
        Ok(result)
    }
}
