//! Validation messages.
//!
//! A [`ValidationMessage`] is an immutable value describing one finding. It is
//! built with the severity constructors and refined with the `with_*` builders.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::file_type::FileType;

/// Message severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks downstream processing.
    Error,
    /// Should be reviewed before proceeding.
    Warning,
    /// Informational only.
    Info,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }
}

impl FromStr for Severity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ModelError::InvalidSeverity(s.to_string()))
    }
}

/// What kind of check produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Schema,
    DataQuality,
    Consistency,
    Drift,
    CodingScheme,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::DataQuality => "data_quality",
            Self::Consistency => "consistency",
            Self::Drift => "drift",
            Self::CodingScheme => "coding_scheme",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub category: Category,
    /// Stable identifier of the check, e.g. `orphaned_records`.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl ValidationMessage {
    pub fn new(
        severity: Severity,
        category: Category,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            code: code.into(),
            file_type: None,
            message: message.into(),
            details: BTreeMap::new(),
            recommendation: None,
        }
    }

    pub fn error(category: Category, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, code, message)
    }

    pub fn warning(
        category: Category,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, category, code, message)
    }

    pub fn info(category: Category, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, code, message)
    }

    #[must_use]
    pub fn for_file(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file_type {
            Some(file_type) => write!(
                f,
                "[{}] {} ({}): {}",
                self.severity.label(),
                file_type,
                self.code,
                self.message
            ),
            None => write!(
                f,
                "[{}] ({}): {}",
                self.severity.label(),
                self.code,
                self.message
            ),
        }
    }
}
