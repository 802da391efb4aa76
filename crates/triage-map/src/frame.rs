//! Canonical views of raw frames.

use polars::prelude::*;

use crate::error::{MapError, Result};
use crate::reconcile::Reconciliation;

/// Select the resolved columns of a raw frame under their canonical names.
///
/// Unmatched targets are absent from the result; unclaimed raw headers are
/// dropped.
pub fn canonical_frame(df: &DataFrame, reconciliation: &Reconciliation) -> Result<DataFrame> {
    let mut columns = Vec::new();
    for (canonical, raw) in reconciliation.resolved() {
        let column = df.column(raw).map_err(|_| MapError::MissingColumn {
            column: raw.to_string(),
        })?;
        columns.push(column.clone().with_name(canonical.into()));
    }
    Ok(DataFrame::new(columns)?)
}
