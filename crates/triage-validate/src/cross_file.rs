//! Cross-file consistency checks.
//!
//! The primary file's join keys are the authoritative applicant set. Every
//! auxiliary file is checked against it for:
//!
//! - **Orphaned records**: keys absent from the primary file. Orphans are
//!   reported once per file and never dropped.
//! - **Coverage**: the fraction of primary applicants the file mentions.
//! - **Rows per applicant**: for one-to-many files, the average number of rows
//!   per represented applicant.
//! - **Missing join keys**: rows whose key cell is blank.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

use triage_ingest::column_keys;
use triage_model::{Cardinality, Category, FileType, ValidationMessage, ValidationResult};
use triage_standards::TriageConfig;

use crate::checks::{SAMPLE_SIZE, status_of};
use crate::error::Result;

/// A frame together with the raw header of its join key.
#[derive(Debug, Clone, Copy)]
pub struct KeyedTable<'a> {
    pub file_type: FileType,
    pub data: &'a DataFrame,
    pub join_key: &'a str,
}

/// Input for cross-file validation.
#[derive(Debug, Clone)]
pub struct CrossFileInput<'a> {
    pub primary: KeyedTable<'a>,
    pub auxiliary: Vec<KeyedTable<'a>>,
}

/// Linkage statistics of one auxiliary file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileLinkage {
    pub rows: usize,
    pub missing_keys: usize,
    pub orphan_rows: usize,
    pub distinct_orphans: usize,
    /// Primary applicants with at least one row in this file.
    pub represented: usize,
    pub coverage: Option<f64>,
    pub rows_per_applicant: Option<f64>,
}

/// Result of cross-file validation.
#[derive(Debug, Default)]
pub struct CrossFileResult {
    /// Messages grouped by the file they concern.
    pub messages_by_file: BTreeMap<FileType, Vec<ValidationMessage>>,
    pub linkage: BTreeMap<FileType, FileLinkage>,
    pub primary_applicants: usize,
}

impl CrossFileResult {
    pub fn has_issues(&self) -> bool {
        self.messages_by_file.values().any(|messages| !messages.is_empty())
    }

    pub fn total_messages(&self) -> usize {
        self.messages_by_file.values().map(Vec::len).sum()
    }

    /// Merge messages and per-file check statuses into a validation result.
    pub fn merge_into(self, result: &mut ValidationResult) {
        for file_type in self.linkage.keys() {
            let status = self
                .messages_by_file
                .get(file_type)
                .map(|messages| status_of(messages))
                .unwrap_or_default();
            result.record_check(*file_type, "cross_file", status);
        }
        for messages in self.messages_by_file.into_values() {
            result.extend(messages);
        }
    }

    fn push(&mut self, file_type: FileType, message: ValidationMessage) {
        self.messages_by_file
            .entry(file_type)
            .or_default()
            .push(message.for_file(file_type));
    }
}

/// Run all cross-file checks.
pub fn check_cross_file(
    input: &CrossFileInput<'_>,
    config: &TriageConfig,
) -> Result<CrossFileResult> {
    let mut result = CrossFileResult::default();

    let primary_keys = column_keys(input.primary.data, input.primary.join_key)?;
    let primary_missing = primary_keys.iter().filter(|key| key.is_none()).count();
    let applicants: HashSet<String> = primary_keys.into_iter().flatten().collect();
    result.primary_applicants = applicants.len();
    if primary_missing > 0 {
        let file_type = input.primary.file_type;
        result.push(file_type, missing_keys_message(file_type, primary_missing));
    }

    for table in &input.auxiliary {
        let linkage = check_auxiliary(table, &applicants, config, &mut result)?;
        debug!(
            file_type = %table.file_type,
            orphans = linkage.orphan_rows,
            coverage = linkage.coverage.unwrap_or_default(),
            "cross-file linkage"
        );
        result.linkage.insert(table.file_type, linkage);
    }

    Ok(result)
}

fn check_auxiliary(
    table: &KeyedTable<'_>,
    applicants: &HashSet<String>,
    config: &TriageConfig,
    result: &mut CrossFileResult,
) -> Result<FileLinkage> {
    let file_type = table.file_type;
    let keys = column_keys(table.data, table.join_key)?;
    let mut linkage = FileLinkage {
        rows: keys.len(),
        ..FileLinkage::default()
    };

    let mut orphans: BTreeSet<&str> = BTreeSet::new();
    let mut represented: HashSet<&str> = HashSet::new();
    let mut linked_rows = 0usize;
    for key in &keys {
        match key {
            None => linkage.missing_keys += 1,
            Some(key) if applicants.contains(key) => {
                represented.insert(key);
                linked_rows += 1;
            }
            Some(key) => {
                linkage.orphan_rows += 1;
                orphans.insert(key);
            }
        }
    }
    linkage.distinct_orphans = orphans.len();
    linkage.represented = represented.len();

    if linkage.orphan_rows > 0 {
        let sample: Vec<&str> = orphans.iter().take(SAMPLE_SIZE).copied().collect();
        result.push(
            file_type,
            ValidationMessage::error(
                Category::Consistency,
                "orphaned_records",
                format!(
                    "{} rows in {file_type} reference {} applicants not in the applicants file",
                    linkage.orphan_rows, linkage.distinct_orphans
                ),
            )
            .with_detail("orphan_rows", linkage.orphan_rows)
            .with_detail("distinct_orphans", linkage.distinct_orphans)
            .with_detail("sample_ids", sample)
            .with_recommendation("Check that all files come from the same export cycle"),
        );
    }

    if linkage.missing_keys > 0 {
        result.push(file_type, missing_keys_message(file_type, linkage.missing_keys));
    }

    let spec = config.file_type_spec(file_type);
    if !applicants.is_empty() {
        let coverage = linkage.represented as f64 / applicants.len() as f64;
        linkage.coverage = Some(coverage);
        if let Some(expected) = spec.and_then(|spec| spec.expected_coverage) {
            let message = format!(
                "{file_type} covers {:.1}% of applicants, expected at least {:.1}%",
                coverage * 100.0,
                expected * 100.0
            );
            let finding = if coverage < expected / 2.0 {
                Some(ValidationMessage::error(
                    Category::Consistency,
                    "applicant_coverage",
                    message,
                ))
            } else if coverage < expected {
                Some(ValidationMessage::warning(
                    Category::Consistency,
                    "applicant_coverage",
                    message,
                ))
            } else {
                None
            };
            if let Some(finding) = finding {
                result.push(
                    file_type,
                    finding
                        .with_detail("coverage", coverage)
                        .with_detail("expected", expected)
                        .with_detail("represented", linkage.represented)
                        .with_detail("applicants", applicants.len()),
                );
            }
        }
    }

    if file_type.cardinality() == Cardinality::OneToMany && linkage.represented > 0 {
        let ratio = linked_rows as f64 / linkage.represented as f64;
        linkage.rows_per_applicant = Some(ratio);
        if let Some(range) = spec.and_then(|spec| spec.rows_per_applicant) {
            let direction = if ratio < range.min {
                Some(("low", "the file may be incomplete"))
            } else if ratio > range.max {
                Some(("high", "rows may be duplicated"))
            } else {
                None
            };
            if let Some((direction, hint)) = direction {
                result.push(
                    file_type,
                    ValidationMessage::warning(
                        Category::Consistency,
                        "rows_per_applicant",
                        format!(
                            "{file_type} averages {ratio:.2} rows per applicant, \
                             outside {}..={}; {hint}",
                            range.min,
                            range.max
                        ),
                    )
                    .with_detail("rows_per_applicant", ratio)
                    .with_detail("direction", direction)
                    .with_detail("min", range.min)
                    .with_detail("max", range.max),
                );
            }
        }
    }

    Ok(linkage)
}

fn missing_keys_message(file_type: FileType, count: usize) -> ValidationMessage {
    ValidationMessage::warning(
        Category::Consistency,
        "missing_join_key_values",
        format!("{count} rows in {file_type} have no applicant identifier"),
    )
    .with_detail("count", count)
    .with_recommendation("These rows cannot be linked to an applicant")
}
