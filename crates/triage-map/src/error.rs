use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("matched column '{column}' is missing from the frame")]
    MissingColumn { column: String },
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for MapError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
