//! Distributional drift between a current table and a reference table.
//!
//! Columns numeric on both sides are compared with the population stability
//! index; every other shared column is compared with the Jensen-Shannon
//! distance over its values as text.

mod metrics;

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::table::Table;
use crate::types::{DriftFlags, DriftResult, JsdRecord, PsiRecord};
use crate::utils::{ColumnKind, round_to};

pub use metrics::{PSI_EPSILON, histogram, jensen_shannon, psi, quantile_edges};

/// Decimal places kept on reported drift scores.
const SCORE_DECIMALS: u32 = 4;

/// Descending by score with undefined scores last; stable among ties.
fn by_score_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compares a current table against a reference table column by column.
pub struct DriftAnalyzer;

impl DriftAnalyzer {
    /// Score every column of `current` that also exists in `reference`.
    ///
    /// Columns missing from the reference are skipped silently. Flags list
    /// the columns whose rounded score meets the configured thresholds.
    pub fn drift_report(
        current: &Table,
        reference: &Table,
        config: &AnalysisConfig,
    ) -> Result<DriftResult> {
        let mut psi_numeric = Vec::new();
        let mut jsd_categorical = Vec::new();

        for info in current.columns() {
            let Some(ref_info) = reference.column(&info.name) else {
                debug!("Column '{}' not in reference, skipping drift", info.name);
                continue;
            };

            if info.kind == ColumnKind::Numeric && ref_info.kind == ColumnKind::Numeric {
                let cur = finite_values(current, &info.name)?;
                let refr = finite_values(reference, &info.name)?;
                let score = psi(&cur, &refr, config.drift_bins);
                psi_numeric.push(PsiRecord {
                    column: info.name.clone(),
                    psi: score.map(|s| round_to(s, SCORE_DECIMALS)),
                });
            } else {
                let cur = current.text_values(&info.name)?;
                let refr = reference.text_values(&info.name)?;
                let cur: Vec<&str> = cur.iter().flatten().map(String::as_str).collect();
                let refr: Vec<&str> = refr.iter().flatten().map(String::as_str).collect();
                let score = jensen_shannon(&cur, &refr);
                jsd_categorical.push(JsdRecord {
                    column: info.name.clone(),
                    jsd: score.map(|s| round_to(s, SCORE_DECIMALS)),
                });
            }
        }

        psi_numeric.sort_by(|a, b| by_score_desc(a.psi, b.psi));
        jsd_categorical.sort_by(|a, b| by_score_desc(a.jsd, b.jsd));

        let flags = DriftFlags {
            psi_threshold: config.psi_threshold,
            jsd_threshold: config.jsd_threshold,
            psi_numeric: psi_numeric
                .iter()
                .filter(|r| r.psi.is_some_and(|s| s >= config.psi_threshold))
                .map(|r| r.column.clone())
                .collect(),
            jsd_categorical: jsd_categorical
                .iter()
                .filter(|r| r.jsd.is_some_and(|s| s >= config.jsd_threshold))
                .map(|r| r.column.clone())
                .collect(),
        };

        info!(
            "Drift: {} numeric and {} categorical columns compared, {} flagged",
            psi_numeric.len(),
            jsd_categorical.len(),
            flags.psi_numeric.len() + flags.jsd_categorical.len()
        );

        Ok(DriftResult {
            psi_numeric,
            jsd_categorical,
            flags,
        })
    }
}

/// Present, finite values of a numeric column.
fn finite_values(table: &Table, name: &str) -> Result<Vec<f64>> {
    Ok(table
        .present_numeric_values(name)?
        .into_iter()
        .filter(|v| v.is_finite())
        .collect())
}
