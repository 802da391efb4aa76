//! Pipeline configuration.
//!
//! The built-in registry is embedded at compile time (see [`crate::embedded`]).
//! A user file only needs to name what it changes: its document is merged on
//! top of the built-in one before deserialization.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use triage_model::FileType;

use crate::embedded::DEFAULT_CONFIG;
use crate::error::{Result, StandardsError};
use crate::registry::{
    BoundKind, CanonicalTarget, FileTypeSpec, JoinKeySpec, NumericBound, TargetRole,
};

/// Column reconciliation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity to accept a fuzzy join-key match.
    pub join_key_threshold: f64,
    /// Minimum similarity to accept a fuzzy match for every other target.
    pub feature_threshold: f64,
    /// Fraction of unmatched feature targets at which coverage becomes an error.
    pub coverage_error_fraction: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            join_key_threshold: 0.80,
            feature_threshold: 0.85,
            coverage_error_fraction: 0.20,
        }
    }
}

/// Per-file structural check parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralConfig {
    pub critical_null_fraction: f64,
    /// Rows missing more than this fraction of their columns look truncated.
    pub truncation_fraction: f64,
    /// Median above which an hours column is assumed to be in minutes.
    pub hours_unit_median: f64,
    /// Maximum above which a GPA column is assumed to use another scale.
    pub gpa_scale_max: f64,
    /// Label coverage at or above which a cycle is a training cycle.
    pub training_label_coverage: f64,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            critical_null_fraction: 0.5,
            truncation_fraction: 0.5,
            hours_unit_median: 10_000.0,
            gpa_scale_max: 4.5,
            training_label_coverage: 0.95,
        }
    }
}

/// Drift significance and effect-size thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftThresholds {
    pub p_value: f64,
    pub numeric_effect: f64,
    pub categorical_effect: f64,
    pub high_risk_effect: f64,
    /// Drifted fraction above which the aggregate is an error.
    pub error_fraction: f64,
    /// Drifted fraction at or above which the aggregate is a warning.
    pub warning_fraction: f64,
    pub zero_prevalence_rate: f64,
    pub balanced_min: f64,
    pub balanced_max: f64,
    pub extreme_low: f64,
    pub extreme_high: f64,
    pub high_risk_features: Vec<String>,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            p_value: 0.01,
            numeric_effect: 0.5,
            categorical_effect: 0.3,
            high_risk_effect: 0.8,
            error_fraction: 0.30,
            warning_fraction: 0.10,
            zero_prevalence_rate: 0.05,
            balanced_min: 0.20,
            balanced_max: 0.80,
            extreme_low: 0.05,
            extreme_high: 0.95,
            high_risk_features: Vec::new(),
        }
    }
}

impl DriftThresholds {
    pub fn is_high_risk(&self, feature: &str) -> bool {
        self.high_risk_features
            .iter()
            .any(|name| name.eq_ignore_ascii_case(feature))
    }
}

/// Location of persisted fitted pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub directory: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("pipelines"),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub structural: StructuralConfig,
    #[serde(default)]
    pub drift: DriftThresholds,
    #[serde(default)]
    pub store: StoreConfig,
    pub join_key: JoinKeySpec,
    #[serde(default)]
    pub file_types: Vec<FileTypeSpec>,
    #[serde(default)]
    pub targets: Vec<CanonicalTarget>,
    #[serde(default)]
    pub bounds: Vec<NumericBound>,
    #[serde(default)]
    pub coded_columns: Vec<String>,
}

impl TriageConfig {
    /// The built-in registry.
    pub fn default_config() -> Result<Self> {
        let value = parse_document(DEFAULT_CONFIG, "built-in registry")?;
        Self::from_value(value, "built-in registry")
    }

    /// Load a user configuration file merged over the built-in registry.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| StandardsError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Parse a configuration document merged over the built-in registry.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let mut base = parse_document(DEFAULT_CONFIG, "built-in registry")?;
        let overlay = parse_document(text, origin)?;
        merge_values(&mut base, overlay);
        Self::from_value(base, origin)
    }

    fn from_value(value: toml::Value, origin: &str) -> Result<Self> {
        let config: Self = value
            .try_into()
            .map_err(|error: toml::de::Error| StandardsError::ConfigParse {
                origin: origin.to_string(),
                message: error.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of thresholds and ranges.
    pub fn validate(&self) -> Result<()> {
        check_unit_fraction("matching.join_key_threshold", self.matching.join_key_threshold)?;
        check_unit_fraction("matching.feature_threshold", self.matching.feature_threshold)?;
        check_unit_fraction(
            "matching.coverage_error_fraction",
            self.matching.coverage_error_fraction,
        )?;
        check_unit_fraction("drift.p_value", self.drift.p_value)?;
        if self.drift.warning_fraction > self.drift.error_fraction {
            return Err(StandardsError::invalid(
                "drift.warning_fraction must not exceed drift.error_fraction",
            ));
        }
        if self.join_key.name.trim().is_empty() {
            return Err(StandardsError::invalid("join_key.name must not be empty"));
        }

        let mut seen = Vec::new();
        for spec in &self.file_types {
            if seen.contains(&spec.file_type) {
                return Err(StandardsError::invalid(format!(
                    "file type {} is configured twice",
                    spec.file_type
                )));
            }
            seen.push(spec.file_type);
            let rows = spec.rows;
            if !(rows.min <= rows.expected_min
                && rows.expected_min <= rows.expected_max
                && rows.expected_max <= rows.max)
            {
                return Err(StandardsError::invalid(format!(
                    "rows for {} must satisfy min <= expected_min <= expected_max <= max",
                    spec.file_type
                )));
            }
            if spec.columns.min > spec.columns.max {
                return Err(StandardsError::invalid(format!(
                    "columns for {} must satisfy min <= max",
                    spec.file_type
                )));
            }
            if let Some(coverage) = spec.expected_coverage {
                check_unit_fraction("expected_coverage", coverage)?;
            }
            if let Some(range) = spec.rows_per_applicant
                && range.min > range.max
            {
                return Err(StandardsError::invalid(format!(
                    "rows_per_applicant for {} must satisfy min <= max",
                    spec.file_type
                )));
            }
        }

        for bound in &self.bounds {
            if bound.hard.min > bound.hard.max || bound.soft.min > bound.soft.max {
                return Err(StandardsError::invalid(format!(
                    "bounds for {}.{} are inverted",
                    bound.file_type, bound.column
                )));
            }
        }

        for target in &self.targets {
            if target.role == TargetRole::JoinKey {
                return Err(StandardsError::invalid(format!(
                    "target {} uses the join_key role; configure [join_key] instead",
                    target.name
                )));
            }
        }
        Ok(())
    }

    pub fn file_type_spec(&self, file_type: FileType) -> Option<&FileTypeSpec> {
        self.file_types
            .iter()
            .find(|spec| spec.file_type == file_type)
    }

    /// Targets to reconcile for a file type, join key first.
    pub fn targets_for(&self, file_type: FileType) -> Vec<CanonicalTarget> {
        let mut targets = vec![self.join_key.target_for(file_type)];
        targets.extend(
            self.targets
                .iter()
                .filter(|target| target.file_type == file_type)
                .cloned(),
        );
        targets
    }

    pub fn bounds_for(&self, file_type: FileType) -> impl Iterator<Item = &NumericBound> {
        self.bounds
            .iter()
            .filter(move |bound| bound.file_type == file_type)
    }

    /// Canonical name of the label column, if one is registered for the file type.
    pub fn label_target(&self, file_type: FileType) -> Option<&CanonicalTarget> {
        self.targets
            .iter()
            .find(|target| target.file_type == file_type && target.role == TargetRole::Label)
    }

    pub fn is_coded(&self, column: &str) -> bool {
        self.coded_columns
            .iter()
            .any(|coded| coded.eq_ignore_ascii_case(column))
    }

    pub fn bound_kind(&self, file_type: FileType, column: &str) -> Option<BoundKind> {
        self.bounds_for(file_type)
            .find(|bound| bound.column.eq_ignore_ascii_case(column))
            .map(|bound| bound.kind)
    }
}

fn parse_document(text: &str, origin: &str) -> Result<toml::Value> {
    toml::from_str::<toml::Value>(text).map_err(|error| StandardsError::ConfigParse {
        origin: origin.to_string(),
        message: error.to_string(),
    })
}

/// Tables merge key by key; any other value replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn check_unit_fraction(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(StandardsError::invalid(format!(
            "{name} must be in (0, 1], got {value}"
        )))
    }
}
