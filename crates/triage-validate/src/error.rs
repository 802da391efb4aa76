//! Error types for validation.
//!
//! Data-quality findings are reported as messages, never as errors. These
//! variants cover inputs the validators cannot work with at all.

use thiserror::Error;

use triage_ingest::IngestError;
use triage_map::MapError;

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Map(#[from] MapError),

    /// A frame handed to a validator lacks a column it was told to read.
    #[error("column '{column}' not found in frame")]
    MissingColumn { column: String },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ValidateError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidateError>;
