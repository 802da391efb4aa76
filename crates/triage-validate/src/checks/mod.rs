//! Per-file check modules.
//!
//! Each module inspects one aspect of a reconciled file and returns messages.
//! Checks never fail: a cell that cannot be read counts as null.

pub mod columns;
pub mod duplicates;
pub mod missing;
pub mod ranges;
pub mod shape;

use polars::prelude::{AnyValue, Column};

use triage_ingest::is_null_value;
use triage_model::{RunStatus, ValidationMessage};

/// Number of sample identifiers attached to a message.
pub(crate) const SAMPLE_SIZE: usize = 5;

/// Whether each cell of a column is null or blank.
pub(crate) fn null_mask(column: &Column) -> Vec<bool> {
    (0..column.len())
        .map(|idx| is_null_value(&column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Worst status implied by a set of messages.
pub fn status_of(messages: &[ValidationMessage]) -> RunStatus {
    messages
        .iter()
        .map(|message| RunStatus::from_severity(message.severity))
        .max()
        .unwrap_or_default()
}
