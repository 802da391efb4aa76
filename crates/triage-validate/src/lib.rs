//! Validation of admissions exports.
//!
//! - [`structural`]: per-file reconciliation, shape, missingness, range and
//!   duplicate checks, plus data-mode detection on the primary file.
//! - [`cross_file`]: join-key linkage between the primary and auxiliary files.
//! - [`schema`] and [`coding`]: differences from a reference cycle.
//! - [`drift`]: distribution drift of applicant-level features.
//!
//! Expected data problems come back as messages. `Err` is reserved for
//! inputs that cannot be read at all.

pub mod checks;
pub mod coding;
pub mod cross_file;
pub mod data_mode;
pub mod drift;
mod engine;
mod error;
pub mod schema;
pub mod structural;

pub use coding::{CodingScheme, compare_coding, infer_coding_scheme};
pub use cross_file::{CrossFileInput, CrossFileResult, FileLinkage, KeyedTable, check_cross_file};
pub use data_mode::{DataModeOutcome, detect_data_mode};
pub use drift::{
    DistributionSummary, DriftFeature, DriftKind, DriftReport, DriftTest, FeatureDrift,
    SkippedFeature, aggregate_severity, detect_drift, is_drifted,
};
pub use engine::{cross_file_input, merge_file_results, validate_tables};
pub use error::{Result, ValidateError};
pub use schema::{ColumnProfile, SchemaSnapshot, ValueType, compare_schemas};
pub use structural::{FileValidation, validate_file};
