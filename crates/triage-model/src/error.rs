use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown file type: {0}")]
    UnknownFileType(String),
    #[error("invalid severity: {0}")]
    InvalidSeverity(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
