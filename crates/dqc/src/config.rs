//! Configuration for a diagnostics run.
//!
//! The engine has no global configuration: every tunable is carried by an
//! [`AnalysisConfig`] value passed into the analyzers that need it. Use
//! [`AnalysisConfig::builder()`] for a validated configuration.

use serde::{Deserialize, Serialize};

/// Upper bound applied to the isolation-forest contamination ratio.
pub const MAX_CONTAMINATION: f64 = 0.49;

/// Configuration for the diagnostics engine.
///
/// # Example
///
/// ```rust,ignore
/// use dqc::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .contamination(0.05)
///     .psi_threshold(0.2)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Expected proportion of anomalous rows for the isolation forest.
    /// Clamped to [0, 0.49] when used.
    /// Default: 0.03
    pub contamination: f64,

    /// Number of trees in the isolation forest.
    /// Default: 200
    pub n_estimators: usize,

    /// Seed for the isolation forest's random number generator.
    /// Default: 42
    pub random_seed: u64,

    /// Multiplier `k` for the IQR fences `Q1 - k*IQR` and `Q3 + k*IQR`.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Number of quantile bins used for numeric drift (PSI).
    /// Default: 10
    pub drift_bins: usize,

    /// Number of top cardinality rows a front-end should display.
    /// The cardinality report itself is never truncated.
    /// Default: 5
    pub cardinality_top_k: usize,

    /// PSI at or above this value flags a numeric column as drifted.
    /// Default: 0.25
    pub psi_threshold: f64,

    /// JSD at or above this value flags a categorical column as drifted.
    /// Default: 0.20
    pub jsd_threshold: f64,

    /// Whether to scan text columns for PII.
    /// Default: true
    pub run_pii_scan: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            contamination: 0.03,
            n_estimators: 200,
            random_seed: 42,
            iqr_multiplier: 1.5,
            drift_bins: 10,
            cardinality_top_k: 5,
            psi_threshold: 0.25,
            jsd_threshold: 0.20,
            run_pii_scan: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Contamination after clamping to `[0, MAX_CONTAMINATION]`.
    pub fn effective_contamination(&self) -> f64 {
        self.contamination.clamp(0.0, MAX_CONTAMINATION)
    }

    /// Validate the configuration and return errors if invalid.
    ///
    /// Out-of-range contamination is not an error; it is clamped on use.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.contamination.is_finite() {
            return Err(ConfigValidationError::NonFinite {
                field: "contamination".to_string(),
            });
        }

        if self.n_estimators == 0 {
            return Err(ConfigValidationError::InvalidEstimators(self.n_estimators));
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "iqr_multiplier".to_string(),
                value: self.iqr_multiplier,
            });
        }

        if self.drift_bins == 0 {
            return Err(ConfigValidationError::InvalidBins(self.drift_bins));
        }

        if !self.psi_threshold.is_finite() || self.psi_threshold < 0.0 {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "psi_threshold".to_string(),
                value: self.psi_threshold,
            });
        }

        if !(0.0..=1.0).contains(&self.jsd_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "jsd_threshold".to_string(),
                value: self.jsd_threshold,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value}")]
    InvalidThreshold { field: String, value: f64 },

    #[error("'{field}' must be a finite number")]
    NonFinite { field: String },

    #[error("Invalid number of estimators: {0} (must be at least 1)")]
    InvalidEstimators(usize),

    #[error("Invalid number of drift bins: {0} (must be at least 1)")]
    InvalidBins(usize),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    contamination: Option<f64>,
    n_estimators: Option<usize>,
    random_seed: Option<u64>,
    iqr_multiplier: Option<f64>,
    drift_bins: Option<usize>,
    cardinality_top_k: Option<usize>,
    psi_threshold: Option<f64>,
    jsd_threshold: Option<f64>,
    run_pii_scan: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Set the expected outlier ratio for the isolation forest.
    pub fn contamination(mut self, contamination: f64) -> Self {
        self.contamination = Some(contamination);
        self
    }

    /// Set the number of isolation trees.
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = Some(n);
        self
    }

    /// Set the random seed used by the isolation forest.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Set the IQR fence multiplier.
    pub fn iqr_multiplier(mut self, k: f64) -> Self {
        self.iqr_multiplier = Some(k);
        self
    }

    /// Set the number of quantile bins for PSI.
    pub fn drift_bins(mut self, bins: usize) -> Self {
        self.drift_bins = Some(bins);
        self
    }

    /// Set the cardinality display size.
    pub fn cardinality_top_k(mut self, k: usize) -> Self {
        self.cardinality_top_k = Some(k);
        self
    }

    /// Set the PSI drift flag threshold.
    pub fn psi_threshold(mut self, threshold: f64) -> Self {
        self.psi_threshold = Some(threshold);
        self
    }

    /// Set the JSD drift flag threshold.
    pub fn jsd_threshold(mut self, threshold: f64) -> Self {
        self.jsd_threshold = Some(threshold);
        self
    }

    /// Enable or disable the PII scan.
    pub fn run_pii_scan(mut self, run: bool) -> Self {
        self.run_pii_scan = Some(run);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            contamination: self.contamination.unwrap_or(defaults.contamination),
            n_estimators: self.n_estimators.unwrap_or(defaults.n_estimators),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            drift_bins: self.drift_bins.unwrap_or(defaults.drift_bins),
            cardinality_top_k: self.cardinality_top_k.unwrap_or(defaults.cardinality_top_k),
            psi_threshold: self.psi_threshold.unwrap_or(defaults.psi_threshold),
            jsd_threshold: self.jsd_threshold.unwrap_or(defaults.jsd_threshold),
            run_pii_scan: self.run_pii_scan.unwrap_or(defaults.run_pii_scan),
        };

        config.validate()?;
        Ok(config)
    }
}
