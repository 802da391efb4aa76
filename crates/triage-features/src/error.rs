//! Feature engineering error types.

use std::path::PathBuf;

use thiserror::Error;

use triage_ingest::IngestError;

#[derive(Debug, Error)]
pub enum FeatureError {
    /// A demographic field was requested as a model input.
    #[error("'{feature}' is a protected attribute and cannot be a model feature")]
    ForbiddenFeature { feature: String },

    #[error("unknown feature column: {feature}")]
    UnknownFeature { feature: String },

    /// Scoring requested a version that was never fitted.
    #[error("no fitted pipeline found for version '{version}' in {}", directory.display())]
    NotFitted { version: String, directory: PathBuf },

    #[error("pipeline version '{version}' already exists at {}", path.display())]
    VersionExists { version: String, path: PathBuf },

    #[error("{} uses store layout {found}; this build reads layout {expected}", path.display())]
    UnsupportedSchema {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("invalid pipeline version '{version}': use letters, digits, '.', '-' or '_'")]
    InvalidVersion { version: String },

    #[error("cannot assemble applicant features without the applicants table")]
    MissingPrimary,

    #[error("Failed to {operation} file: {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock pipeline store at {}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize or parse {}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid rubric scores in {origin}: {reason}")]
    Rubric { origin: String, reason: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for FeatureError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeatureError>;
