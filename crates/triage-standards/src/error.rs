//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or checking a configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StandardsError {
    /// Configuration file not readable.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration document is not valid TOML or has the wrong shape.
    #[error("failed to parse config {origin}: {message}")]
    ConfigParse { origin: String, message: String },

    /// Configuration values are inconsistent.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl StandardsError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, StandardsError>;
