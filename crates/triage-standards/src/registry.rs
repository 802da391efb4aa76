//! Canonical target registry and per-file expectations.

use serde::{Deserialize, Serialize};

use triage_model::FileType;

/// Role a canonical column plays for its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRole {
    /// Per-applicant identifier used to join files.
    JoinKey,
    /// Outcome label; present only in training cycles.
    Label,
    /// Input to feature engineering; counted for coverage.
    Feature,
    /// Checked for ranges and schema, not used as a model input.
    Attribute,
}

/// A canonical column name with the raw spellings it is known under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTarget {
    pub name: String,
    pub file_type: FileType,
    pub role: TargetRole,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CanonicalTarget {
    pub fn is_join_key(&self) -> bool {
        self.role == TargetRole::JoinKey
    }

    pub fn is_feature(&self) -> bool {
        self.role == TargetRole::Feature
    }
}

/// The shared applicant identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinKeySpec {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl JoinKeySpec {
    pub fn target_for(&self, file_type: FileType) -> CanonicalTarget {
        CanonicalTarget {
            name: self.name.clone(),
            file_type,
            role: TargetRole::JoinKey,
            aliases: self.aliases.clone(),
        }
    }
}

/// Row-count expectations: `min..=max` is acceptable, `expected_min..=expected_max` typical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCountRange {
    pub min: usize,
    pub expected_min: usize,
    pub expected_max: usize,
    pub max: usize,
}

impl RowCountRange {
    pub fn is_expected(&self, rows: usize) -> bool {
        rows >= self.expected_min && rows <= self.expected_max
    }

    pub fn is_acceptable(&self, rows: usize) -> bool {
        rows >= self.min && rows <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCountRange {
    pub min: usize,
    pub max: usize,
}

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Expectations for one file type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTypeSpec {
    pub file_type: FileType,
    pub rows: RowCountRange,
    pub columns: ColumnCountRange,
    /// Canonical names whose missingness above the critical fraction is an error.
    #[serde(default)]
    pub critical_columns: Vec<String>,
    /// Minimum fraction of primary applicants expected to appear in this file.
    #[serde(default)]
    pub expected_coverage: Option<f64>,
    /// Typical rows per represented applicant for one-to-many files.
    #[serde(default)]
    pub rows_per_applicant: Option<ValueRange>,
}

impl FileTypeSpec {
    pub fn is_critical(&self, column: &str) -> bool {
        self.critical_columns
            .iter()
            .any(|critical| critical.eq_ignore_ascii_case(column))
    }
}

/// Category of a numeric bound; drives the unit and scale heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Hours,
    Age,
    Gpa,
    Ordinal,
    Count,
}

/// Plausible value ranges for a canonical numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericBound {
    pub file_type: FileType,
    pub column: String,
    pub kind: BoundKind,
    /// Values outside this range are impossible.
    pub hard: ValueRange,
    /// Values outside this range are unusual.
    pub soft: ValueRange,
}
