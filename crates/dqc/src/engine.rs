//! One-call orchestration of every analyzer.
//!
//! [`DiagnosticsEngine::run`] executes each analyzer independently with the
//! engine's [`AnalysisConfig`] and assembles their outputs into a
//! [`ReportBundle`]. Callers that need only part of the diagnostics can call
//! the analyzers directly instead.

use std::time::Instant;

use tracing::{error, info};

use crate::config::AnalysisConfig;
use crate::drift::DriftAnalyzer;
use crate::error::{Result, ResultExt};
use crate::outliers::OutlierDetector;
use crate::profiler::TableStats;
use crate::quality::{DuplicateDetector, PiiScanner};
use crate::reporting::{ReportAssembler, ReportBundle, ReportInputs};
use crate::table::Table;

/// Runs the full diagnostics suite over a table.
#[derive(Debug, Clone)]
pub struct DiagnosticsEngine {
    config: AnalysisConfig,
}

static_assertions::assert_impl_all!(DiagnosticsEngine: Send, Sync);

impl DiagnosticsEngine {
    /// Create an engine, rejecting an invalid configuration.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `current`, comparing it against `reference` when one is given.
    pub fn run(&self, current: &Table, reference: Option<&Table>) -> Result<ReportBundle> {
        match self.run_internal(current, reference) {
            Ok(bundle) => Ok(bundle),
            Err(e) => {
                error!("Diagnostics failed: {}", e);
                Err(e)
            }
        }
    }

    fn run_internal(&self, current: &Table, reference: Option<&Table>) -> Result<ReportBundle> {
        let start_time = Instant::now();
        info!(
            "Starting diagnostics on {} rows x {} columns",
            current.height(),
            current.width()
        );

        info!("Step 1: Profiling columns...");
        let schema = TableStats::infer_schema(current).context("Schema inference failed")?;
        let missing = TableStats::summarize_missing(current).context("Missingness failed")?;
        let cardinality = TableStats::cardinality_report(current, self.config.cardinality_top_k)
            .context("Cardinality failed")?;
        let constant_columns =
            TableStats::constant_columns(current).context("Constant column check failed")?;
        let numeric_summary =
            TableStats::numeric_summary(current).context("Numeric summary failed")?;

        info!("Step 2: Detecting duplicates...");
        let duplicates =
            DuplicateDetector::detect_duplicates(current).context("Duplicate detection failed")?;

        info!("Step 3: Detecting outliers...");
        let iqr_outliers = OutlierDetector::iqr_outliers(current, self.config.iqr_multiplier)
            .context("IQR outlier detection failed")?;
        let isolation_forest_outliers =
            OutlierDetector::isolation_forest_outliers(current, &self.config)
                .context("Isolation forest failed")?;

        let drift = match reference {
            Some(reference) => {
                info!("Step 4: Comparing against reference...");
                Some(
                    DriftAnalyzer::drift_report(current, reference, &self.config)
                        .context("Drift analysis failed")?,
                )
            }
            None => {
                info!("Step 4: Skipping drift (no reference table)");
                None
            }
        };

        let pii = if self.config.run_pii_scan {
            info!("Step 5: Scanning text columns for PII...");
            Some(PiiScanner::pii_scan(current).context("PII scan failed")?)
        } else {
            info!("Step 5: Skipping PII scan (disabled)");
            None
        };

        let bundle = ReportAssembler::build_report_bundle(ReportInputs {
            current,
            schema,
            missing,
            duplicates,
            cardinality,
            constant_columns,
            numeric_summary,
            iqr_outliers,
            isolation_forest_outliers,
            drift,
            pii,
        });

        info!(
            "Diagnostics completed in {} ms",
            start_time.elapsed().as_millis()
        );
        Ok(bundle)
    }
}

impl Default for DiagnosticsEngine {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValidationError;
    use crate::error::DqcError;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn current() -> Table {
        Table::new(
            df![
                "id" => [1i64, 2, 3, 3],
                "amount" => [Some(10.0f64), None, Some(12.5), Some(12.5)],
                "contact" => ["a@b.com", "hello", "111-22-3333", "111-22-3333"],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = AnalysisConfig {
            drift_bins: 0,
            ..AnalysisConfig::default()
        };
        let err = DiagnosticsEngine::new(config).unwrap_err();
        assert!(matches!(
            err,
            DqcError::InvalidConfig(ConfigValidationError::InvalidBins(0))
        ));
    }

    #[test]
    fn test_run_without_reference() {
        let engine = DiagnosticsEngine::default();
        let bundle = engine.run(&current(), None).unwrap();

        assert_eq!(bundle.meta.rows, 4);
        assert_eq!(bundle.meta.cols, 3);
        assert_eq!(bundle.schema.len(), 3);
        assert_eq!(bundle.duplicates.count, 2);
        assert_eq!(bundle.numeric_summary.len(), 2);
        assert_eq!(bundle.outliers.isolation_forest.flags.len(), 4);
        assert!(bundle.drift.is_none());

        let pii = bundle.pii.unwrap();
        assert_eq!(pii[0].email_hits, 1);
        assert_eq!(pii[0].ssn_hits, 2);
    }

    #[test]
    fn test_run_with_reference() {
        let reference = Table::new(
            df![
                "id" => [7i64, 8, 9, 10],
                "contact" => ["x", "y", "z", "w"],
            ]
            .unwrap(),
        );
        let bundle = DiagnosticsEngine::default()
            .run(&current(), Some(&reference))
            .unwrap();

        let drift = bundle.drift.unwrap();
        let jsd = drift.jsd_categorical.unwrap();
        assert_eq!(jsd[0].column, "contact");
        assert_eq!(jsd[0].jsd, Some(1.0));
        assert_eq!(drift.flags.jsd_categorical, vec!["contact".to_string()]);
        assert_eq!(drift.psi_numeric.unwrap()[0].column, "id");
    }

    #[test]
    fn test_run_pii_disabled() {
        let config = AnalysisConfig::builder().run_pii_scan(false).build().unwrap();
        let bundle = DiagnosticsEngine::new(config)
            .unwrap()
            .run(&current(), None)
            .unwrap();
        assert!(bundle.pii.is_none());
    }

    #[test]
    fn test_run_empty_table() {
        let bundle = DiagnosticsEngine::default()
            .run(&Table::empty(), None)
            .unwrap();

        assert_eq!(bundle.meta.rows, 0);
        assert!(bundle.schema.is_empty());
        assert_eq!(bundle.outliers.iqr.n_outliers, 0);
        assert_eq!(bundle.outliers.isolation_forest.n_outliers, 0);
        assert!(bundle.pii.is_none());
    }

    #[test]
    fn test_run_is_deterministic() {
        let engine = DiagnosticsEngine::default();
        let table = current();
        let first = ReportAssembler::to_json_pretty(&engine.run(&table, None).unwrap()).unwrap();
        let second = ReportAssembler::to_json_pretty(&engine.run(&table, None).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
