//! Applicant-level assembly from canonical frames.

use std::collections::BTreeMap;

use polars::prelude::*;

use triage_features::{AssembleOptions, FeatureError, assemble};
use triage_model::FileType;
use triage_standards::TriageConfig;

fn options() -> AssembleOptions {
    AssembleOptions::from_config(&TriageConfig::default_config().unwrap())
}

fn make_df(cols: Vec<(&str, Vec<&str>)>) -> DataFrame {
    let columns: Vec<Column> = cols
        .into_iter()
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();
    DataFrame::new(columns).expect("dataframe")
}

fn applicants() -> DataFrame {
    DataFrame::new(vec![
        Column::new("amcas_id".into(), [101i64, 102, 103]),
        Column::new("exp_hour_total".into(), [Some(1_200.0f64), None, Some(40.0)]),
        Column::new("pell_grant".into(), ["Yes", "No", ""]),
        Column::new(
            "application_review_score".into(),
            [Some(21i64), Some(14), None],
        ),
    ])
    .unwrap()
}

#[test]
fn options_follow_the_registry() {
    let options = options();
    assert_eq!(options.join_key, "amcas_id");
    assert_eq!(options.label.as_deref(), Some("application_review_score"));
}

#[test]
fn applicants_table_is_required() {
    let frames = BTreeMap::from([(
        FileType::Languages,
        make_df(vec![("amcas_id", vec!["101"])]),
    )]);
    assert!(matches!(
        assemble(&frames, &options()),
        Err(FeatureError::MissingPrimary)
    ));
}

#[test]
fn primary_values_keep_missing_cells_missing() {
    let frames = BTreeMap::from([(FileType::Applicants, applicants())]);
    let dataset = assemble(&frames, &options()).unwrap();

    assert_eq!(dataset.ids().collect::<Vec<_>>(), vec!["101", "102", "103"]);
    let first = dataset.get("101").unwrap();
    assert_eq!(first.numeric("exp_hour_total"), Some(1_200.0));
    assert_eq!(first.binary("pell_grant"), Some(true));
    assert_eq!(first.label, Some(21.0));

    let second = dataset.get("102").unwrap();
    assert_eq!(second.numeric("exp_hour_total"), None);
    assert_eq!(second.binary("pell_grant"), Some(false));

    let third = dataset.get("103").unwrap();
    assert_eq!(third.binary("pell_grant"), None);
    assert_eq!(third.label, None);
    assert_eq!(dataset.labelled_count(), 2);
}

#[test]
fn auxiliary_files_are_aggregated_per_applicant() {
    let frames = BTreeMap::from([
        (FileType::Applicants, applicants()),
        (
            FileType::Languages,
            make_df(vec![
                ("amcas_id", vec!["101", "101", "102", "999"]),
                ("language_desc", vec!["English", "Spanish", "English", "French"]),
            ]),
        ),
        (
            FileType::Parents,
            make_df(vec![
                ("amcas_id", vec!["101", "101", "102"]),
                (
                    "edu_level",
                    vec!["High School Graduate (high school diploma or equivalent)", "Masters Degree", "Vocational"],
                ),
            ]),
        ),
        (
            FileType::Experiences,
            make_df(vec![
                ("amcas_id", vec!["101", "101", "103"]),
                (
                    "exp_type",
                    vec![
                        "Research/Lab",
                        "Community Service/Volunteer - Medical/Clinical",
                        "Leadership - Not Listed Elsewhere",
                    ],
                ),
                ("exp_name", vec!["Protein lab", "Free clinic", "Club president"]),
                ("exp_desc", vec!["Dean's List semester", "", "Ran meetings"]),
            ]),
        ),
        (
            FileType::GpaTrend,
            make_df(vec![
                ("amcas_id", vec!["101", "102"]),
                ("gpa_trend", vec!["Upward", "Stable"]),
            ]),
        ),
        (
            FileType::SecondaryApplication,
            make_df(vec![
                ("amcas_id", vec!["101", "103"]),
                ("employed_undergrad", vec!["Yes", "No"]),
            ]),
        ),
    ]);
    let dataset = assemble(&frames, &options()).unwrap();
    assert_eq!(dataset.len(), 3);

    let first = dataset.get("101").unwrap();
    assert_eq!(first.numeric("num_languages"), Some(2.0));
    assert_eq!(first.numeric("parent_max_education_ordinal"), Some(5.0));
    assert_eq!(first.binary("has_research"), Some(true));
    assert_eq!(first.binary("has_volunteering"), Some(true));
    assert_eq!(first.binary("has_direct_patient_care"), Some(true));
    assert_eq!(first.binary("has_honors"), Some(true));
    assert_eq!(first.binary("has_leadership"), Some(false));
    assert_eq!(first.category("gpa_trend"), Some("Upward"));
    assert_eq!(first.binary("employed_undergrad"), Some(true));

    let second = dataset.get("102").unwrap();
    assert_eq!(second.numeric("num_languages"), Some(1.0));
    // Unknown education levels rank 2.
    assert_eq!(second.numeric("parent_max_education_ordinal"), Some(2.0));
    assert_eq!(second.binary("has_research"), None);
    assert_eq!(second.binary("employed_undergrad"), None);

    let third = dataset.get("103").unwrap();
    assert_eq!(third.numeric("num_languages"), None);
    assert_eq!(third.binary("has_leadership"), Some(true));
    assert_eq!(third.binary("has_direct_patient_care"), Some(false));
    assert_eq!(third.binary("employed_undergrad"), Some(false));
}

#[test]
fn repeated_primary_ids_keep_the_first_row() {
    let frames = BTreeMap::from([(
        FileType::Applicants,
        DataFrame::new(vec![
            Column::new("amcas_id".into(), ["7", "7.0", "8"]),
            Column::new("exp_hour_total".into(), [10.0f64, 99.0, 20.0]),
        ])
        .unwrap(),
    )]);
    let dataset = assemble(&frames, &options()).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.get("7").unwrap().numeric("exp_hour_total"), Some(10.0));
}

#[test]
fn frame_view_exposes_nulls_for_drift_checks() {
    let frames = BTreeMap::from([(FileType::Applicants, applicants())]);
    let frame = assemble(&frames, &options()).unwrap().to_frame().unwrap();

    assert_eq!(frame.height(), 3);
    let hours = frame.column("exp_hour_total").unwrap();
    assert_eq!(hours.null_count(), 1);
    let pell = frame.column("pell_grant").unwrap();
    assert_eq!(pell.get(0).unwrap(), AnyValue::Float64(1.0));
    assert_eq!(frame.column("gpa_trend").unwrap().null_count(), 3);
}
