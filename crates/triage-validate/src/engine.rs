//! Parallel dispatch of per-file validation.

use rayon::prelude::*;
use tracing::info;

use triage_ingest::RawTable;
use triage_model::ValidationResult;
use triage_standards::TriageConfig;

use crate::cross_file::{CrossFileInput, KeyedTable};
use crate::structural::{FileValidation, validate_file};

/// Validate every table on the rayon pool.
///
/// Results come back in table order.
pub fn validate_tables(tables: &[RawTable], config: &TriageConfig) -> Vec<FileValidation> {
    let validations: Vec<FileValidation> = tables
        .par_iter()
        .map(|table| validate_file(table, config))
        .collect();
    info!(
        files = validations.len(),
        errors = validations
            .iter()
            .map(|validation| validation.result.error_count())
            .sum::<usize>(),
        "structural validation finished"
    );
    validations
}

/// Merge per-file results into one, in file order.
pub fn merge_file_results(validations: &[FileValidation]) -> ValidationResult {
    let mut result = ValidationResult::new();
    for validation in validations {
        result.merge(validation.result.clone());
    }
    result
}

/// Pair tables with their resolved join keys for cross-file checks.
///
/// Returns `None` when the primary file is absent or has no join key. Files
/// without a join key are left out.
pub fn cross_file_input<'a>(
    tables: &'a [RawTable],
    validations: &'a [FileValidation],
) -> Option<CrossFileInput<'a>> {
    let keyed: Vec<KeyedTable<'a>> = tables
        .iter()
        .zip(validations)
        .filter_map(|(table, validation)| {
            validation.join_key_column().map(|join_key| KeyedTable {
                file_type: table.file_type(),
                data: table.data(),
                join_key,
            })
        })
        .collect();
    let primary = *keyed.iter().find(|table| table.file_type.is_primary())?;
    let auxiliary = keyed
        .into_iter()
        .filter(|table| !table.file_type.is_primary())
        .collect();
    Some(CrossFileInput { primary, auxiliary })
}
