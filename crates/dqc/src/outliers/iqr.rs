//! Interquartile-range fences.

use super::NumericMatrix;
use crate::utils::{quantile_sorted, sort_floats};

/// Lower and upper fences `Q1 - k*IQR` and `Q3 + k*IQR` of the values.
///
/// Returns `None` for empty input.
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Option<(f64, f64)> {
    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);

    let q1 = quantile_sorted(&sorted, 0.25)?;
    let q3 = quantile_sorted(&sorted, 0.75)?;
    let iqr = q3 - q1;

    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// A row is flagged when any column lies strictly outside its fences.
pub(super) fn flag_rows(matrix: &NumericMatrix, multiplier: f64) -> Vec<bool> {
    let mut flags = vec![false; matrix.rows];

    for column in &matrix.values {
        let Some((lower, upper)) = iqr_bounds(column, multiplier) else {
            continue;
        };
        for (flag, value) in flags.iter_mut().zip(column) {
            if *value < lower || *value > upper {
                *flag = true;
            }
        }
    }

    flags
}
