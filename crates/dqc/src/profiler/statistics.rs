//! Descriptive statistics for numeric columns.

use crate::utils::{quantile_sorted, sort_floats};

/// Count, moments and order statistics of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Describe non-missing values. Quartiles use linear interpolation.
pub(crate) fn describe(values: &[f64]) -> Describe {
    if values.is_empty() {
        return Describe::default();
    }

    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);

    Describe {
        count: values.len(),
        mean: Some(calculate_mean(values)),
        std: calculate_std(values),
        min: sorted.first().copied(),
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

pub(crate) fn calculate_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); undefined below two values.
pub(crate) fn calculate_std(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    if n <= 1.0 {
        return None;
    }

    let mean = calculate_mean(values);
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}
