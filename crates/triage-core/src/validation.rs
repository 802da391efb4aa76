//! Whole-cycle validation.

use tracing::{info, info_span};

use triage_features::{ApplicantDataset, AssembleOptions, assemble};
use triage_ingest::RawTable;
use triage_model::{FileType, ValidationMessage, ValidationResult};
use triage_standards::TriageConfig;
use triage_standards::features::{
    BINARY_FEATURES, CATEGORICAL_FEATURES, EXPERIENCE_FLAGS, NUMERIC_FEATURES,
};
use triage_validate::checks::status_of;
use triage_validate::{
    DriftFeature, DriftKind, DriftReport, FileValidation, SchemaSnapshot, check_cross_file,
    compare_schemas, cross_file_input, detect_drift, merge_file_results, validate_tables,
};

use crate::cycle::{canonical_frames, required_file_messages};
use crate::error::Result;
use crate::reference::ReferenceBaseline;

/// Everything learned from validating one cycle.
#[derive(Debug, Clone)]
pub struct CycleValidation {
    pub result: ValidationResult,
    pub files: Vec<FileValidation>,
    /// Present when the primary file could be linked.
    pub dataset: Option<ApplicantDataset>,
    /// Present when a reference was given and a dataset was assembled.
    pub drift: Option<DriftReport>,
}

impl CycleValidation {
    pub fn can_proceed(&self) -> bool {
        self.result.can_proceed()
    }
}

/// Applicant-level features screened for drift, by family.
pub fn drift_features() -> Vec<DriftFeature> {
    let numeric = NUMERIC_FEATURES
        .iter()
        .map(|name| DriftFeature::new(*name, DriftKind::Numeric));
    let binary = BINARY_FEATURES
        .iter()
        .chain(EXPERIENCE_FLAGS.iter())
        .map(|name| DriftFeature::new(*name, DriftKind::Binary));
    let categorical = CATEGORICAL_FEATURES
        .iter()
        .map(|name| DriftFeature::new(*name, DriftKind::Categorical));
    numeric.chain(binary).chain(categorical).collect()
}

/// Runs every check on a cycle.
///
/// Required files, per-file structure (in parallel), cross-file linkage, and
/// with a reference, schema evolution and drift. Findings accumulate in the
/// returned result; `Err` means an input could not be processed at all.
pub fn validate_cycle(
    tables: &[RawTable],
    reference: Option<&ReferenceBaseline>,
    config: &TriageConfig,
) -> Result<CycleValidation> {
    let span = info_span!("validate_cycle", files = tables.len());
    let _guard = span.enter();

    let mut result = ValidationResult::new();
    result.extend(required_file_messages(tables));

    let files = validate_tables(tables, config);
    result.merge(merge_file_results(&files));

    if let Some(input) = cross_file_input(tables, &files) {
        check_cross_file(&input, config)?.merge_into(&mut result);
    }

    let frames = canonical_frames(
        tables
            .iter()
            .zip(&files)
            .map(|(table, file)| (table, &file.reconciliation)),
    )?;
    let dataset = if frames.contains_key(&FileType::Applicants) {
        Some(assemble(&frames, &AssembleOptions::from_config(config))?)
    } else {
        None
    };

    let mut drift = None;
    if let Some(reference) = reference {
        for (table, file) in tables.iter().zip(&files) {
            let Some(baseline) = reference.schema(table.file_type()) else {
                continue;
            };
            let current = SchemaSnapshot::from_table(table, &file.reconciliation, config)?;
            let messages = compare_schemas(baseline, &current, config);
            record(&mut result, table.file_type(), "schema", messages);
        }
        if let Some(dataset) = &dataset {
            let report = detect_drift(
                &reference.dataset.to_frame()?,
                &dataset.to_frame()?,
                &drift_features(),
                &config.drift,
            )?;
            record(
                &mut result,
                FileType::Applicants,
                "drift",
                report.messages(),
            );
            drift = Some(report);
        }
    }

    info!(
        status = result.overall_status().label(),
        errors = result.error_count(),
        warnings = result.warning_count(),
        can_proceed = result.can_proceed(),
        "cycle validated"
    );
    Ok(CycleValidation {
        result,
        files,
        dataset,
        drift,
    })
}

fn record(
    result: &mut ValidationResult,
    file_type: FileType,
    check: &str,
    messages: Vec<ValidationMessage>,
) {
    result.record_check(file_type, check, status_of(&messages));
    result.extend(messages);
}
