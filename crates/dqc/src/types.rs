//! Result records produced by the analyzers.
//!
//! Every record serializes to the JSON shape used in the report bundle. Field
//! renames such as `25%` and the threshold-keyed drift flags live here.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::utils::ColumnKind;

/// One row of example data: field name to value, in column order.
pub type RecordRow = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Table statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub column: String,
    /// Physical dtype, e.g. `i64`, `f64`, `str`.
    pub dtype: String,
    pub kind: ColumnKind,
    /// First non-missing value within the first rows, or null.
    pub sample_value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingnessRecord {
    pub column: String,
    pub missing: usize,
    pub missing_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardinalityRecord {
    pub column: String,
    pub nunique: usize,
    pub unique_ratio: f64,
}

/// Descriptive statistics of one numeric column.
///
/// Statistics are `None` when undefined for the column (no values, or fewer
/// than two values for `std`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummaryRecord {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q1: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q3: Option<f64>,
    pub max: Option<f64>,
    pub missing: usize,
    pub missing_pct: f64,
}

// ============================================================================
// Duplicates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DuplicateResult {
    /// Rows that belong to any duplicate group, every copy counted.
    pub count: usize,
    /// Up to ten duplicated rows in original order.
    pub examples: Vec<RecordRow>,
}

// ============================================================================
// Outliers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlierResult {
    /// One flag per row; empty when nothing could be scored.
    pub flags: Vec<bool>,
    pub n_outliers: usize,
    pub outlier_indices: Vec<usize>,
    /// Ensemble decision scores, higher means more normal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f64>>,
}

impl OutlierResult {
    /// Result for a table with nothing to score.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result from per-row flags.
    pub fn from_flags(flags: Vec<bool>) -> Self {
        let outlier_indices: Vec<usize> = flags
            .iter()
            .enumerate()
            .filter_map(|(i, flagged)| flagged.then_some(i))
            .collect();

        Self {
            n_outliers: outlier_indices.len(),
            outlier_indices,
            flags,
            scores: None,
        }
    }

    pub fn with_scores(mut self, scores: Vec<f64>) -> Self {
        self.scores = Some(scores);
        self
    }
}

// ============================================================================
// Drift
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsiRecord {
    pub column: String,
    pub psi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsdRecord {
    pub column: String,
    pub jsd: Option<f64>,
}

const PSI_FLAG_PREFIX: &str = "psi_numeric_ge_";
const JSD_FLAG_PREFIX: &str = "jsd_categorical_ge_";

/// Columns whose drift score met the configured thresholds.
///
/// Serialized as `{"psi_numeric_ge_0.25": [...], "jsd_categorical_ge_0.20": [...]}`,
/// with each threshold embedded in its key.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftFlags {
    pub psi_threshold: f64,
    pub jsd_threshold: f64,
    pub psi_numeric: Vec<String>,
    pub jsd_categorical: Vec<String>,
}

impl DriftFlags {
    pub fn psi_key(&self) -> String {
        format!("{}{:.2}", PSI_FLAG_PREFIX, self.psi_threshold)
    }

    pub fn jsd_key(&self) -> String {
        format!("{}{:.2}", JSD_FLAG_PREFIX, self.jsd_threshold)
    }
}

impl Serialize for DriftFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(&self.psi_key(), &self.psi_numeric)?;
        map.serialize_entry(&self.jsd_key(), &self.jsd_categorical)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for DriftFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        let mut psi = None;
        let mut jsd = None;

        for (key, columns) in raw {
            if let Some(threshold) = key.strip_prefix(PSI_FLAG_PREFIX) {
                let threshold = threshold.parse::<f64>().map_err(D::Error::custom)?;
                psi = Some((threshold, columns));
            } else if let Some(threshold) = key.strip_prefix(JSD_FLAG_PREFIX) {
                let threshold = threshold.parse::<f64>().map_err(D::Error::custom)?;
                jsd = Some((threshold, columns));
            }
        }

        let (psi_threshold, psi_numeric) =
            psi.ok_or_else(|| D::Error::missing_field(PSI_FLAG_PREFIX))?;
        let (jsd_threshold, jsd_categorical) =
            jsd.ok_or_else(|| D::Error::missing_field(JSD_FLAG_PREFIX))?;

        Ok(Self {
            psi_threshold,
            jsd_threshold,
            psi_numeric,
            jsd_categorical,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    /// Sorted descending by PSI, undefined scores last.
    pub psi_numeric: Vec<PsiRecord>,
    /// Sorted descending by JSD, undefined scores last.
    pub jsd_categorical: Vec<JsdRecord>,
    pub flags: DriftFlags,
}

// ============================================================================
// PII
// ============================================================================

/// Pattern hits in one text column. Only columns with a hit are reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiFinding {
    pub column: String,
    pub email_hits: usize,
    pub phone_hits: usize,
    pub ssn_hits: usize,
    pub credit_card_hits: usize,
}

impl PiiFinding {
    pub fn total_hits(&self) -> usize {
        self.email_hits + self.phone_hits + self.ssn_hits + self.credit_card_hits
    }
}

static_assertions::assert_impl_all!(DriftResult: Send, Sync);
static_assertions::assert_impl_all!(OutlierResult: Send, Sync);
static_assertions::assert_impl_all!(DuplicateResult: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outlier_result_from_flags() {
        let result = OutlierResult::from_flags(vec![false, true, false, true]);
        assert_eq!(result.n_outliers, 2);
        assert_eq!(result.outlier_indices, vec![1, 3]);
        assert!(result.scores.is_none());
    }

    #[test]
    fn test_outlier_scores_omitted_when_absent() {
        let json = serde_json::to_value(OutlierResult::from_flags(vec![true])).unwrap();
        assert!(json.get("scores").is_none());

        let scored = OutlierResult::from_flags(vec![true]).with_scores(vec![-0.1]);
        let json = serde_json::to_value(scored).unwrap();
        assert_eq!(json["scores"], serde_json::json!([-0.1]));
    }

    #[test]
    fn test_drift_flags_keys_embed_thresholds() {
        let flags = DriftFlags {
            psi_threshold: 0.25,
            jsd_threshold: 0.2,
            psi_numeric: vec!["amount".to_string()],
            jsd_categorical: vec![],
        };
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(
            json,
            r#"{"psi_numeric_ge_0.25":["amount"],"jsd_categorical_ge_0.20":[]}"#
        );

        let back: DriftFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn test_numeric_summary_quartile_keys() {
        let record = NumericSummaryRecord {
            column: "a".to_string(),
            count: 2,
            mean: Some(1.5),
            std: Some(0.7071),
            min: Some(1.0),
            q1: Some(1.25),
            median: Some(1.5),
            q3: Some(1.75),
            max: Some(2.0),
            missing: 0,
            missing_pct: 0.0,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["25%"], serde_json::json!(1.25));
        assert_eq!(json["50%"], serde_json::json!(1.5));
        assert_eq!(json["75%"], serde_json::json!(1.75));
    }
}
