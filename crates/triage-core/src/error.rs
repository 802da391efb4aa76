//! Orchestration error types.

use thiserror::Error;

use triage_features::FeatureError;
use triage_ingest::IngestError;
use triage_map::MapError;
use triage_validate::ValidateError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
