//! Registry and configuration for the admissions triage pipeline.
//!
//! Provides the canonical target registry, per-file expectations, numeric
//! bounds, drift thresholds and the feature catalog. The built-in registry is
//! embedded; a TOML file can override any part of it.

mod config;
mod embedded;
mod error;
pub mod features;
mod registry;

pub use config::{DriftThresholds, MatchingConfig, StoreConfig, StructuralConfig, TriageConfig};
pub use embedded::DEFAULT_CONFIG;
pub use error::{Result, StandardsError};
pub use features::FeatureFamily;
pub use registry::{
    BoundKind, CanonicalTarget, ColumnCountRange, FileTypeSpec, JoinKeySpec, NumericBound,
    RowCountRange, TargetRole, ValueRange,
};
