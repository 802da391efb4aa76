//! Row and column count checks.

use triage_model::{Category, FileType, ValidationMessage};
use triage_standards::FileTypeSpec;

/// Compare the row count with the acceptable and expected ranges.
pub fn check_rows(file_type: FileType, rows: usize, spec: &FileTypeSpec) -> Vec<ValidationMessage> {
    let range = spec.rows;
    if range.is_expected(rows) {
        return Vec::new();
    }
    let message = if !range.is_acceptable(rows) {
        let bound = if rows < range.min { "minimum" } else { "maximum" };
        ValidationMessage::error(
            Category::DataQuality,
            "row_count",
            format!("{file_type} has {rows} rows, beyond the {bound} of the acceptable range"),
        )
        .with_recommendation("Confirm the export is complete and for the right cycle")
    } else {
        ValidationMessage::warning(
            Category::DataQuality,
            "row_count",
            format!(
                "{file_type} has {rows} rows, outside the expected {}-{}",
                range.expected_min, range.expected_max
            ),
        )
    };
    vec![
        message
            .for_file(file_type)
            .with_detail("rows", rows)
            .with_detail("min", range.min)
            .with_detail("expected_min", range.expected_min)
            .with_detail("expected_max", range.expected_max)
            .with_detail("max", range.max),
    ]
}

/// Compare the column count with the configured range.
pub fn check_columns(
    file_type: FileType,
    columns: usize,
    spec: &FileTypeSpec,
) -> Vec<ValidationMessage> {
    let range = spec.columns;
    let message = if columns < range.min {
        ValidationMessage::error(
            Category::Schema,
            "column_count",
            format!(
                "{file_type} has {columns} columns, fewer than the minimum of {}",
                range.min
            ),
        )
        .with_recommendation("The export layout has likely changed")
    } else if columns > range.max {
        ValidationMessage::warning(
            Category::Schema,
            "column_count",
            format!(
                "{file_type} has {columns} columns, more than the usual maximum of {}",
                range.max
            ),
        )
    } else {
        return Vec::new();
    };
    vec![
        message
            .for_file(file_type)
            .with_detail("columns", columns)
            .with_detail("min", range.min)
            .with_detail("max", range.max),
    ]
}
