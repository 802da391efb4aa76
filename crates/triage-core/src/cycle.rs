//! Loading one admissions cycle and projecting it onto canonical columns.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::DataFrame;
use tracing::{info, info_span};

use triage_ingest::{LoadedDirectory, RawTable, load_directory};
use triage_map::{Reconciliation, canonical_frame};
use triage_model::{Category, FileType, ValidationMessage};

use crate::error::Result;

/// Discovers and reads every export in `dir`, one read per file.
pub fn load_cycle(dir: &Path) -> Result<LoadedDirectory> {
    let span = info_span!("load_cycle", dir = %dir.display());
    let _guard = span.enter();

    let loaded = load_directory(dir)?;
    info!(
        files = loaded.tables.len(),
        unrecognized = loaded.unrecognized.len(),
        "cycle loaded"
    );
    Ok(loaded)
}

/// One ERROR per required file type absent from the cycle.
pub fn required_file_messages(tables: &[RawTable]) -> Vec<ValidationMessage> {
    FileType::ALL
        .iter()
        .copied()
        .filter(|file_type| file_type.is_required())
        .filter(|file_type| !tables.iter().any(|table| table.file_type() == *file_type))
        .map(|file_type| {
            ValidationMessage::error(
                Category::Schema,
                "required_file_missing",
                format!("Required file {} is missing from the cycle", file_type.label()),
            )
            .for_file(file_type)
            .with_recommendation("Add the export to the cycle directory and rerun")
        })
        .collect()
}

/// Canonical frames for every table whose join key was resolved.
pub fn canonical_frames<'a, I>(pairs: I) -> Result<BTreeMap<FileType, DataFrame>>
where
    I: IntoIterator<Item = (&'a RawTable, &'a Reconciliation)>,
{
    let mut frames = BTreeMap::new();
    for (table, reconciliation) in pairs {
        if reconciliation.join_key_column().is_none() {
            continue;
        }
        frames.insert(
            table.file_type(),
            canonical_frame(table.data(), reconciliation)?,
        );
    }
    Ok(frames)
}
