//! Reference baselines for schema evolution and drift.

use std::collections::BTreeMap;

use tracing::{info, info_span};

use triage_features::{ApplicantDataset, AssembleOptions, assemble};
use triage_ingest::RawTable;
use triage_map::{ColumnReconciler, Reconciliation};
use triage_model::FileType;
use triage_standards::TriageConfig;
use triage_validate::SchemaSnapshot;

use crate::cycle::canonical_frames;
use crate::error::Result;

/// What a new cycle is compared against. Passed explicitly, never global.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceBaseline {
    pub schemas: BTreeMap<FileType, SchemaSnapshot>,
    pub dataset: ApplicantDataset,
}

impl ReferenceBaseline {
    pub fn schema(&self, file_type: FileType) -> Option<&SchemaSnapshot> {
        self.schemas.get(&file_type)
    }
}

/// Builds the baseline from a previously accepted cycle.
pub fn build_reference(tables: &[RawTable], config: &TriageConfig) -> Result<ReferenceBaseline> {
    let span = info_span!("build_reference", files = tables.len());
    let _guard = span.enter();

    let reconciler = ColumnReconciler::from_config(&config.matching);
    let reconciliations: Vec<Reconciliation> = tables
        .iter()
        .map(|table| {
            let file_type = table.file_type();
            reconciler.reconcile(file_type, &table.columns(), &config.targets_for(file_type))
        })
        .collect();

    let mut schemas = BTreeMap::new();
    for (table, reconciliation) in tables.iter().zip(&reconciliations) {
        schemas.insert(
            table.file_type(),
            SchemaSnapshot::from_table(table, reconciliation, config)?,
        );
    }

    let frames = canonical_frames(tables.iter().zip(&reconciliations))?;
    let dataset = assemble(&frames, &AssembleOptions::from_config(config))?;
    info!(
        files = schemas.len(),
        applicants = dataset.len(),
        "reference baseline built"
    );
    Ok(ReferenceBaseline { schemas, dataset })
}
