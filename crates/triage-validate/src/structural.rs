//! Per-file structural validation.

use tracing::debug;

use triage_ingest::RawTable;
use triage_map::{ColumnReconciler, Reconciliation};
use triage_model::{FileCheckResult, FileType, ValidationMessage, ValidationResult};
use triage_standards::TriageConfig;

use crate::checks::{columns, duplicates, missing, ranges, shape, status_of};
use crate::data_mode::{DataModeOutcome, detect_data_mode};

/// Outcome of validating one file on its own.
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub file_type: FileType,
    pub reconciliation: Reconciliation,
    pub result: ValidationResult,
    /// Set for the primary file only.
    pub data_mode: Option<DataModeOutcome>,
}

impl FileValidation {
    /// Raw join-key header, if it was resolved.
    pub fn join_key_column(&self) -> Option<&str> {
        self.reconciliation.join_key_column()
    }

    /// Files without a join key take no part in cross-file checks.
    pub fn is_linkable(&self) -> bool {
        self.join_key_column().is_some()
    }
}

/// Reconcile one table and run every structural check on it.
///
/// Checks stop after column reconciliation when the join key is missing.
pub fn validate_file(table: &RawTable, config: &TriageConfig) -> FileValidation {
    let file_type = table.file_type();
    let df = table.data();
    let reconciler = ColumnReconciler::from_config(&config.matching);
    let reconciliation =
        reconciler.reconcile(file_type, &table.columns(), &config.targets_for(file_type));

    let mut result = ValidationResult::new();
    let mut detail = FileCheckResult::new(table.height(), table.width());
    detail.join_key = reconciliation.join_key_column().map(str::to_string);
    detail.column_matches = reconciliation.matches().to_vec();
    result.merge_file_detail(file_type, detail);

    record(
        &mut result,
        file_type,
        "columns",
        columns::check(&reconciliation, &config.matching),
    );
    if reconciliation.join_key_column().is_none() {
        debug!(file_type = %file_type, "join key missing; skipping remaining checks");
        return FileValidation {
            file_type,
            reconciliation,
            result,
            data_mode: None,
        };
    }

    let spec = config.file_type_spec(file_type);
    if let Some(spec) = spec {
        record(
            &mut result,
            file_type,
            "row_count",
            shape::check_rows(file_type, table.height(), spec),
        );
        record(
            &mut result,
            file_type,
            "column_count",
            shape::check_columns(file_type, table.width(), spec),
        );
    }
    record(
        &mut result,
        file_type,
        "missingness",
        missing::check(df, &reconciliation, spec, &config.structural),
    );
    record(
        &mut result,
        file_type,
        "ranges",
        ranges::check(
            df,
            &reconciliation,
            config.bounds_for(file_type),
            &config.structural,
        ),
    );
    record(
        &mut result,
        file_type,
        "duplicates",
        duplicates::check(df, &reconciliation),
    );

    let data_mode = if file_type.is_primary() {
        let label = config.label_target(file_type).map(|target| target.name.as_str());
        let outcome = detect_data_mode(df, &reconciliation, label, &config.structural);
        result.set_data_mode(outcome.mode);
        let messages: Vec<ValidationMessage> = outcome
            .message()
            .map(|message| message.for_file(file_type))
            .into_iter()
            .collect();
        record(&mut result, file_type, "data_mode", messages);
        Some(outcome)
    } else {
        None
    };

    debug!(
        file_type = %file_type,
        status = result.overall_status().label(),
        messages = result.total_messages(),
        "structural checks finished"
    );
    FileValidation {
        file_type,
        reconciliation,
        result,
        data_mode,
    }
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
