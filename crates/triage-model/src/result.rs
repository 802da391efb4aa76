//! Accumulated validation outcome.
//!
//! [`ValidationResult`] starts empty and only grows. Its status is derived from
//! the messages pushed into it and can never be downgraded: once an error is
//! recorded the result stays in the error state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::file_type::FileType;
use crate::mapping::ColumnMatch;
use crate::message::{Severity, ValidationMessage};

/// Status of a run or of a single named check.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Success,
    Warning,
    Error,
}

impl RunStatus {
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Error,
            Severity::Warning => Self::Warning,
            Severity::Info => Self::Success,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Whether the uploaded cycle carries outcome labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Labels present for (nearly) every applicant.
    Training,
    /// No labels; applicants are to be scored.
    Scoring,
    /// Labels present for only part of the cohort.
    Mixed,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Scoring => "scoring",
            Self::Mixed => "mixed",
        }
    }
}

/// Per-file facts and named check statuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileCheckResult {
    pub row_count: usize,
    pub column_count: usize,
    /// Raw header resolved as the applicant identifier.
    pub join_key: Option<String>,
    pub column_matches: Vec<ColumnMatch>,
    pub checks: BTreeMap<String, RunStatus>,
}

impl FileCheckResult {
    pub fn new(row_count: usize, column_count: usize) -> Self {
        Self {
            row_count,
            column_count,
            ..Self::default()
        }
    }

    /// Record a check status, keeping the worst status seen for that check.
    pub fn record_check(&mut self, check: impl Into<String>, status: RunStatus) {
        let entry = self.checks.entry(check.into()).or_default();
        if status > *entry {
            *entry = status;
        }
    }

    pub fn status(&self) -> RunStatus {
        self.checks.values().copied().max().unwrap_or_default()
    }
}

/// Aggregated outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationMessage>,
    warnings: Vec<ValidationMessage>,
    info: Vec<ValidationMessage>,
    overall_status: RunStatus,
    can_proceed: bool,
    data_mode: Option<DataMode>,
    per_file_detail: BTreeMap<FileType, FileCheckResult>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            overall_status: RunStatus::Success,
            can_proceed: true,
            data_mode: None,
            per_file_detail: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, message: ValidationMessage) {
        self.raise(RunStatus::from_severity(message.severity));
        match message.severity {
            Severity::Error => self.errors.push(message),
            Severity::Warning => self.warnings.push(message),
            Severity::Info => self.info.push(message),
        }
    }

    pub fn extend<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = ValidationMessage>,
    {
        for message in messages {
            self.push(message);
        }
    }

    /// Merge another result into this one. Messages keep their order.
    pub fn merge(&mut self, other: ValidationResult) {
        let ValidationResult {
            errors,
            warnings,
            info,
            overall_status,
            data_mode,
            per_file_detail,
            ..
        } = other;
        self.extend(errors);
        self.extend(warnings);
        self.extend(info);
        self.raise(overall_status);
        if let Some(mode) = data_mode {
            self.set_data_mode(mode);
        }
        for (file_type, detail) in per_file_detail {
            self.merge_file_detail(file_type, detail);
        }
    }

    /// Record the detected data mode. The first mode recorded wins.
    pub fn set_data_mode(&mut self, mode: DataMode) {
        if self.data_mode.is_none() {
            self.data_mode = Some(mode);
        }
    }

    pub fn merge_file_detail(&mut self, file_type: FileType, detail: FileCheckResult) {
        match self.per_file_detail.get_mut(&file_type) {
            Some(existing) => {
                if existing.join_key.is_none() {
                    existing.join_key = detail.join_key;
                }
                if existing.column_matches.is_empty() {
                    existing.column_matches = detail.column_matches;
                }
                existing.row_count = existing.row_count.max(detail.row_count);
                existing.column_count = existing.column_count.max(detail.column_count);
                for (check, status) in detail.checks {
                    existing.record_check(check, status);
                }
            }
            None => {
                self.per_file_detail.insert(file_type, detail);
            }
        }
    }

    pub fn record_check(&mut self, file_type: FileType, check: impl Into<String>, status: RunStatus) {
        self.per_file_detail
            .entry(file_type)
            .or_default()
            .record_check(check, status);
    }

    fn raise(&mut self, status: RunStatus) {
        if status > self.overall_status {
            self.overall_status = status;
        }
        self.can_proceed = self.overall_status != RunStatus::Error;
    }

    pub fn errors(&self) -> &[ValidationMessage] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    pub fn info(&self) -> &[ValidationMessage] {
        &self.info
    }

    pub fn overall_status(&self) -> RunStatus {
        self.overall_status
    }

    pub fn can_proceed(&self) -> bool {
        self.can_proceed
    }

    pub fn data_mode(&self) -> Option<DataMode> {
        self.data_mode
    }

    pub fn per_file_detail(&self) -> &BTreeMap<FileType, FileCheckResult> {
        &self.per_file_detail
    }

    pub fn file_detail(&self, file_type: FileType) -> Option<&FileCheckResult> {
        self.per_file_detail.get(&file_type)
    }

    /// All messages, errors first.
    pub fn messages(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    pub fn messages_with_code<'a>(
        &'a self,
        code: &'a str,
    ) -> impl Iterator<Item = &'a ValidationMessage> + 'a {
        self.messages().filter(move |message| message.code == code)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn total_messages(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }
}
