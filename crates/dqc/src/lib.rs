//! Data Quality Checks Library
//!
//! Descriptive data-quality diagnostics over a tabular dataset, built on Polars.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Profiling**: Schema with sample values, missingness, cardinality, constant
//!   columns and numeric summary statistics
//! - **Duplicates**: Full-row duplicate detection with example rows
//! - **Outliers**: IQR fences and an isolation forest over numeric columns
//! - **Drift**: PSI for numeric columns and Jensen-Shannon distance for everything
//!   else, against a reference table
//! - **PII**: Regex scanning of text columns for emails, phone numbers, SSNs and
//!   card numbers
//! - **Reporting**: A single serializable [`ReportBundle`] combining all of the above
//!
//! Analyzers are stateless and never raise for "nothing to analyze" inputs such as
//! an empty table or a table without numeric columns; they return empty or null
//! results instead.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dqc::{AnalysisConfig, DiagnosticsEngine, ReportAssembler, Table};
//! use polars::prelude::*;
//!
//! let current = Table::new(
//!     CsvReadOptions::default()
//!         .with_has_header(true)
//!         .try_into_reader_with_file_path(Some("current.csv".into()))?
//!         .finish()?,
//! );
//!
//! let config = AnalysisConfig::builder()
//!     .contamination(0.05)
//!     .psi_threshold(0.2)
//!     .build()?;
//!
//! let bundle = DiagnosticsEngine::new(config)?.run(&current, None)?;
//! println!("{}", ReportAssembler::to_json_pretty(&bundle)?);
//! ```
//!
//! # Individual Analyzers
//!
//! Each analyzer can also be called on its own:
//!
//! ```rust,ignore
//! use dqc::{DriftAnalyzer, OutlierDetector, PiiScanner, TableStats};
//!
//! let missing = TableStats::summarize_missing(&current)?;
//! let outliers = OutlierDetector::iqr_outliers(&current, 1.5)?;
//! let drift = DriftAnalyzer::drift_report(&current, &reference, &config)?;
//! let pii = PiiScanner::pii_scan(&current)?;
//! ```

pub mod config;
pub mod drift;
pub mod engine;
pub mod error;
pub mod outliers;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use drift::DriftAnalyzer;
pub use engine::DiagnosticsEngine;
pub use error::{DqcError, Result as DqcResult, ResultExt};
pub use outliers::{IsolationForest, OutlierDetector};
pub use profiler::TableStats;
pub use quality::{DuplicateDetector, PiiKind, PiiScanner};
pub use reporting::{
    DriftSection, OutlierSection, ReportAssembler, ReportBundle, ReportInputs, ReportMeta,
};
pub use table::{ColumnInfo, Table};
pub use types::{
    CardinalityRecord, ColumnSchema, DriftFlags, DriftResult, DuplicateResult, JsdRecord,
    MissingnessRecord, NumericSummaryRecord, OutlierResult, PiiFinding, PsiRecord, RecordRow,
};
pub use utils::ColumnKind;
