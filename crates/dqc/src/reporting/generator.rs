use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ResultExt};
use crate::table::Table;
use crate::types::{
    CardinalityRecord, ColumnSchema, DriftFlags, DriftResult, DuplicateResult, JsdRecord,
    MissingnessRecord, NumericSummaryRecord, OutlierResult, PiiFinding, PsiRecord,
};

// ============================================================================
// Report Types
// ============================================================================

/// Shape of the current table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub rows: usize,
    pub cols: usize,
}

/// Results of both outlier detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSection {
    pub iqr: OutlierResult,
    pub isolation_forest: OutlierResult,
}

/// Drift results as they appear in the report. Empty score lists become null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftSection {
    pub psi_numeric: Option<Vec<PsiRecord>>,
    pub jsd_categorical: Option<Vec<JsdRecord>>,
    pub flags: DriftFlags,
}

impl From<DriftResult> for DriftSection {
    fn from(result: DriftResult) -> Self {
        Self {
            psi_numeric: non_empty(result.psi_numeric),
            jsd_categorical: non_empty(result.jsd_categorical),
            flags: result.flags,
        }
    }
}

/// Every diagnostic for one current table, ready for serialization.
///
/// Field order is fixed, so serializing equal bundles yields identical
/// bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    pub meta: ReportMeta,
    pub schema: Vec<ColumnSchema>,
    pub missing: Vec<MissingnessRecord>,
    pub duplicates: DuplicateResult,
    pub cardinality: Vec<CardinalityRecord>,
    pub constant_columns: Vec<String>,
    pub numeric_summary: Vec<NumericSummaryRecord>,
    pub outliers: OutlierSection,
    /// Null when drift was not computed.
    pub drift: Option<DriftSection>,
    /// Null when the scan was not run or found nothing.
    pub pii: Option<Vec<PiiFinding>>,
}

/// Analyzer outputs handed to [`ReportAssembler::build_report_bundle`].
#[derive(Debug, Clone)]
pub struct ReportInputs<'a> {
    pub current: &'a Table,
    pub schema: Vec<ColumnSchema>,
    pub missing: Vec<MissingnessRecord>,
    pub duplicates: DuplicateResult,
    pub cardinality: Vec<CardinalityRecord>,
    pub constant_columns: Vec<String>,
    pub numeric_summary: Vec<NumericSummaryRecord>,
    pub iqr_outliers: OutlierResult,
    pub isolation_forest_outliers: OutlierResult,
    pub drift: Option<DriftResult>,
    pub pii: Option<Vec<PiiFinding>>,
}

fn non_empty<T>(records: Vec<T>) -> Option<Vec<T>> {
    (!records.is_empty()).then_some(records)
}

// ============================================================================
// Report Assembler
// ============================================================================

/// Merges analyzer outputs into a [`ReportBundle`].
pub struct ReportAssembler;

impl ReportAssembler {
    /// Combine every analyzer's output into one bundle.
    ///
    /// Missing and empty optional analyses collapse to null: a PII scan that
    /// found nothing renders the same as one that never ran.
    pub fn build_report_bundle(inputs: ReportInputs<'_>) -> ReportBundle {
        let meta = ReportMeta {
            rows: inputs.current.height(),
            cols: inputs.current.width(),
        };
        debug!("Assembling report for {} x {} table", meta.rows, meta.cols);

        ReportBundle {
            meta,
            schema: inputs.schema,
            missing: inputs.missing,
            duplicates: inputs.duplicates,
            cardinality: inputs.cardinality,
            constant_columns: inputs.constant_columns,
            numeric_summary: inputs.numeric_summary,
            outliers: OutlierSection {
                iqr: inputs.iqr_outliers,
                isolation_forest: inputs.isolation_forest_outliers,
            },
            drift: inputs.drift.map(DriftSection::from),
            pii: inputs.pii.and_then(non_empty),
        }
    }

    /// Pretty-printed JSON for the bundle.
    pub fn to_json_pretty(bundle: &ReportBundle) -> Result<String> {
        Ok(serde_json::to_string_pretty(bundle)?)
    }

    /// Write the bundle as pretty JSON, creating parent directories as needed.
    pub fn write_report_to_file(bundle: &ReportBundle, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory {}", parent.display()))?;
        }

        let json = Self::to_json_pretty(bundle)?;
        let mut file =
            File::create(path).context(format!("Failed to create {}", path.display()))?;
        file.write_all(json.as_bytes())
            .context(format!("Failed to write {}", path.display()))?;

        info!("Report saved: {}", path.display());
        Ok(())
    }
}
