//! Missingness checks.

use polars::prelude::DataFrame;

use triage_map::Reconciliation;
use triage_model::{Category, ValidationMessage};
use triage_standards::{FileTypeSpec, StructuralConfig};

use super::{SAMPLE_SIZE, null_mask};

/// Check critical-column missingness, empty columns and truncated rows.
pub fn check(
    df: &DataFrame,
    reconciliation: &Reconciliation,
    spec: Option<&FileTypeSpec>,
    config: &StructuralConfig,
) -> Vec<ValidationMessage> {
    let file_type = reconciliation.file_type();
    let height = df.height();
    let width = df.width();
    let mut messages = Vec::new();
    if height == 0 || width == 0 {
        return messages;
    }

    let mut nulls_per_row = vec![0usize; height];
    let mut empty_columns = Vec::new();
    for column in df.get_columns() {
        let mask = null_mask(column);
        let null_count = mask.iter().filter(|is_null| **is_null).count();
        for (row, is_null) in mask.iter().enumerate() {
            if *is_null {
                nulls_per_row[row] += 1;
            }
        }
        if null_count == height {
            empty_columns.push(column.name().to_string());
        }
    }

    if let Some(spec) = spec {
        for critical in &spec.critical_columns {
            let Some(raw) = reconciliation.raw_for(critical) else {
                continue;
            };
            let Ok(column) = df.column(raw) else {
                continue;
            };
            let null_count = null_mask(column).iter().filter(|is_null| **is_null).count();
            let fraction = null_count as f64 / height as f64;
            if fraction > config.critical_null_fraction {
                messages.push(
                    ValidationMessage::error(
                        Category::DataQuality,
                        "critical_column_missing_values",
                        format!(
                            "{critical} is empty in {:.0}% of {file_type} rows",
                            fraction * 100.0
                        ),
                    )
                    .for_file(file_type)
                    .with_detail("column", critical.clone())
                    .with_detail("raw_column", raw)
                    .with_detail("null_fraction", fraction)
                    .with_detail("null_count", null_count),
                );
            }
        }
    }

    if !empty_columns.is_empty() {
        messages.push(
            ValidationMessage::warning(
                Category::DataQuality,
                "empty_columns",
                format!("{} columns in {file_type} contain no values", empty_columns.len()),
            )
            .for_file(file_type)
            .with_detail("columns", empty_columns),
        );
    }

    let truncated: Vec<usize> = nulls_per_row
        .iter()
        .enumerate()
        .filter(|(_, nulls)| **nulls as f64 / width as f64 > config.truncation_fraction)
        .map(|(row, _)| row)
        .collect();
    if !truncated.is_empty() {
        let sample: Vec<usize> = truncated.iter().take(SAMPLE_SIZE).map(|row| row + 1).collect();
        messages.push(
            ValidationMessage::warning(
                Category::DataQuality,
                "possible_truncation",
                format!(
                    "{} rows in {file_type} are missing more than half of their values",
                    truncated.len()
                ),
            )
            .for_file(file_type)
            .with_detail("row_count", truncated.len())
            .with_detail("sample_rows", sample)
            .with_recommendation("Rows may have been cut short during export"),
        );
    }

    messages
}
