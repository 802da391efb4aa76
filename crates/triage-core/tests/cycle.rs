//! Whole-cycle validation.

mod common;

use std::fs;

use common::{CycleShape, HOURS, config, cycle, experiences, replace, training_cycle};
use polars::prelude::*;
use triage_core::{build_reference, load_cycle, required_file_messages, validate_cycle};
use triage_ingest::RawTable;
use triage_model::{DataMode, FileType, RunStatus, Severity};

const SCHEMA_CHANGES: [&str; 4] = [
    "column_added",
    "column_removed",
    "column_renamed",
    "column_type_changed",
];

fn experiences_without(column: &str) -> RawTable {
    let mut frame = experiences().data().clone();
    let _ = frame.drop_in_place(column).expect("drop column");
    RawTable::new(FileType::Experiences, frame)
}

#[test]
fn complete_cycle_can_proceed() {
    let tables = training_cycle();
    let validation = validate_cycle(&tables, None, &config()).expect("validate");

    assert_eq!(validation.result.error_count(), 0);
    assert!(validation.can_proceed());
    assert_eq!(validation.result.data_mode(), Some(DataMode::Training));
    assert_eq!(validation.files.len(), tables.len());
    assert!(validation.drift.is_none());

    let dataset = validation.dataset.as_ref().expect("assembled dataset");
    assert_eq!(dataset.len(), common::APPLICANTS);
    assert_eq!(dataset.labelled_count(), common::APPLICANTS);
}

#[test]
fn each_missing_required_file_is_one_error() {
    let tables: Vec<RawTable> = training_cycle()
        .into_iter()
        .filter(|table| {
            !matches!(
                table.file_type(),
                FileType::Languages | FileType::Parents
            )
        })
        .collect();

    let messages = required_file_messages(&tables);
    let missing: Vec<_> = messages.iter().filter_map(|m| m.file_type).collect();
    assert_eq!(missing, vec![FileType::Languages, FileType::Parents]);
    assert!(messages.iter().all(|m| m.severity == Severity::Error));

    let validation = validate_cycle(&tables, None, &config()).expect("validate");
    assert_eq!(
        validation
            .result
            .messages_with_code("required_file_missing")
            .count(),
        2
    );
    assert!(!validation.can_proceed());
}

#[test]
fn optional_files_are_not_required() {
    let messages = required_file_messages(&training_cycle());
    assert!(messages.is_empty());
}

#[test]
fn without_primary_file_no_dataset_is_assembled() {
    let tables: Vec<RawTable> = training_cycle()
        .into_iter()
        .filter(|table| table.file_type() != FileType::Applicants)
        .collect();
    let validation = validate_cycle(&tables, None, &config()).expect("validate");

    assert!(validation.dataset.is_none());
    assert_eq!(validation.result.data_mode(), None);
    assert!(!validation.can_proceed());
}

#[test]
fn same_cycle_as_reference_shows_no_drift_or_schema_change() {
    let config = config();
    let tables = training_cycle();
    let reference = build_reference(&tables, &config).expect("reference");
    assert_eq!(reference.schemas.len(), tables.len());

    let validation = validate_cycle(&tables, Some(&reference), &config).expect("validate");
    let drift = validation.drift.as_ref().expect("drift report");
    assert_eq!(drift.drifted().count(), 0);
    assert_eq!(drift.severity, Severity::Info);
    assert_eq!(
        validation
            .result
            .messages()
            .filter(|m| SCHEMA_CHANGES.contains(&m.code.as_str()))
            .count(),
        0
    );
    let detail = validation
        .result
        .file_detail(FileType::Applicants)
        .expect("applicants detail");
    assert_eq!(detail.checks.get("drift"), Some(&RunStatus::Success));
    assert_eq!(detail.checks.get("schema"), Some(&RunStatus::Success));
    assert!(validation.can_proceed());
}

#[test]
fn shifted_hours_are_reported_as_high_risk_drift() {
    let config = config();
    let reference = build_reference(&training_cycle(), &config).expect("reference");
    let shifted = cycle(CycleShape {
        hours_offset: 2_000.0,
        ..CycleShape::default()
    });

    let validation = validate_cycle(&shifted, Some(&reference), &config).expect("validate");
    let drift = validation.drift.as_ref().expect("drift report");
    for name in HOURS {
        assert!(
            drift.feature(name).is_some_and(|f| f.drifted),
            "{name} should drift"
        );
    }
    assert!(
        validation
            .result
            .messages_with_code("high_risk_drift")
            .any(|m| m.detail("feature") == Some(&serde_json::json!("exp_hour_total")))
    );
    assert!(!validation.can_proceed());
}

#[test]
fn removed_optional_column_is_a_schema_warning() {
    let config = config();
    let reference = build_reference(&training_cycle(), &config).expect("reference");
    let mut tables = training_cycle();
    replace(&mut tables, experiences_without("Exp_Desc"));

    let validation = validate_cycle(&tables, Some(&reference), &config).expect("validate");
    let removed: Vec<_> = validation
        .result
        .messages_with_code("column_removed")
        .collect();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].file_type, Some(FileType::Experiences));
    assert_eq!(removed[0].severity, Severity::Warning);
    assert_eq!(
        validation
            .result
            .file_detail(FileType::Experiences)
            .and_then(|detail| detail.checks.get("schema")),
        Some(&RunStatus::Warning)
    );
}

#[test]
fn removed_critical_column_is_a_schema_error() {
    let config = config();
    let reference = build_reference(&training_cycle(), &config).expect("reference");
    let mut tables = training_cycle();
    replace(&mut tables, experiences_without("Exp_Type"));

    let validation = validate_cycle(&tables, Some(&reference), &config).expect("validate");
    let removed: Vec<_> = validation
        .result
        .messages_with_code("column_removed")
        .collect();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].severity, Severity::Error);
    assert_eq!(removed[0].detail("column"), Some(&serde_json::json!("exp_type")));
    assert!(!validation.can_proceed());
}

#[test]
fn loads_cycle_from_csv_exports() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("1. Applicants.csv"),
        "AMCAS ID,exp_hour_total\n1,10\n2,20\n",
    )
    .expect("write");
    fs::write(
        dir.path().join("export.csv"),
        "amcas_id,language_desc\n1,Spanish\n",
    )
    .expect("write");
    fs::write(dir.path().join("notes.csv"), "unrelated\nx\n").expect("write");

    let loaded = load_cycle(dir.path()).expect("load");
    assert_eq!(
        loaded.file_types(),
        vec![FileType::Applicants, FileType::Languages]
    );
    assert_eq!(loaded.unrecognized.len(), 1);
    let applicants = loaded.table(FileType::Applicants).expect("applicants");
    assert_eq!(applicants.height(), 2);
    assert_eq!(
        applicants.data().column("exp_hour_total").expect("column").dtype(),
        &DataType::Int64
    );
}
