//! Fit/transform behavior of the feature pipeline.

use proptest::prelude::*;

use triage_features::{
    ApplicantDataset, ApplicantRecord, FeatureError, FeaturePipeline, RubricScores,
    UNSCORED_RUBRIC,
};
use triage_standards::features::{PROTECTED_ATTRIBUTES, RUBRIC_SCORED_FLAG};

fn training() -> ApplicantDataset {
    ApplicantDataset::new(vec![
        ApplicantRecord::new("1")
            .with_numeric("exp_hour_total", 100.0)
            .with_numeric("exp_hour_volunteer_med", 30.0)
            .with_numeric("exp_hour_volunteer_non_med", 90.0)
            .with_binary("pell_grant", true)
            .with_binary("first_generation_ind", true)
            .with_binary("paid_employment_bf_18", true)
            .with_binary("has_research", true)
            .with_binary("has_leadership", true)
            .with_category("gpa_trend", "Upward")
            .with_label(20.0),
        ApplicantRecord::new("2")
            .with_numeric("exp_hour_total", 500.0)
            .with_numeric("exp_hour_shadowing", 40.0)
            .with_numeric("exp_hour_employ_med", 160.0)
            .with_binary("pell_grant", false)
            .with_category("gpa_trend", "Stable")
            .with_label(12.0),
        ApplicantRecord::new("3")
            .with_numeric("exp_hour_total", 300.0)
            .with_category("gpa_trend", "Downward")
            .with_label(17.0),
    ])
}

fn rubric() -> RubricScores {
    let mut scores = RubricScores::new();
    scores.insert("1", "writing_quality", 3.0);
    scores.insert("1", "motivation_depth", 4.0);
    scores.insert("2", "writing_quality", 0.0);
    scores
}

#[test]
fn columns_follow_the_catalog_order() {
    let fitted = FeaturePipeline::new().fit(&training(), None).unwrap();
    let columns = &fitted.feature_columns;

    assert_eq!(columns.len(), 11 + 10 + 7 + 9 + 1);
    assert_eq!(columns[0], "exp_hour_total");
    assert_eq!(columns.last().map(String::as_str), Some("gpa_trend"));
    assert!(!fitted.includes_rubric());

    let with_rubric = FeaturePipeline::new().fit(&training(), Some(&rubric())).unwrap();
    assert_eq!(with_rubric.feature_columns.len(), 38 + 21 + 1);
    assert_eq!(
        with_rubric.feature_columns.last().map(String::as_str),
        Some(RUBRIC_SCORED_FLAG)
    );
}

#[test]
fn protected_attributes_are_rejected() {
    for protected in PROTECTED_ATTRIBUTES {
        let pipeline = FeaturePipeline::with_columns(["exp_hour_total", protected]);
        let err = pipeline.fit(&training(), None).unwrap_err();
        assert!(
            matches!(err, FeatureError::ForbiddenFeature { ref feature } if feature == protected),
            "{err:?}"
        );
    }
    let err = FeaturePipeline::with_columns(["Age"])
        .fit(&training(), None)
        .unwrap_err();
    assert!(matches!(err, FeatureError::ForbiddenFeature { .. }));
}

#[test]
fn unknown_columns_are_rejected() {
    let err = FeaturePipeline::with_columns(["shoe_size"])
        .fit(&training(), None)
        .unwrap_err();
    assert!(matches!(err, FeatureError::UnknownFeature { .. }));
}

#[test]
fn missing_values_use_fitted_state() {
    let fitted = FeaturePipeline::new().fit(&training(), None).unwrap();
    assert_eq!(fitted.median("exp_hour_total"), Some(300.0));
    // No training values at all.
    assert_eq!(fitted.median("num_languages"), Some(0.0));

    let scoring = ApplicantDataset::new(vec![
        ApplicantRecord::new("9").with_category("gpa_trend", "Erratic"),
        ApplicantRecord::new("10").with_category("gpa_trend", "upward"),
    ]);
    let table = fitted.transform(&scoring, None);

    assert_eq!(table.value("9", "exp_hour_total"), Some(300.0));
    assert_eq!(table.value("9", "pell_grant"), Some(0.0));
    assert_eq!(table.value("9", "has_research"), Some(0.0));
    assert_eq!(table.value("9", "gpa_trend"), Some(0.0));
    assert_eq!(
        table.value("10", "gpa_trend"),
        Some(f64::from(fitted.code_for("gpa_trend", "Upward")))
    );
    assert!(table.value("10", "gpa_trend").unwrap() > 0.0);
}

#[test]
fn composites_are_derived_from_observed_values() {
    let (_, table) = FeaturePipeline::new().fit_transform(&training(), None).unwrap();

    assert_eq!(table.value("1", "total_volunteer_hours"), Some(120.0));
    assert_eq!(table.value("1", "community_engaged_ratio"), Some(0.75));
    assert_eq!(table.value("1", "adversity_count"), Some(2.0));
    assert_eq!(table.value("1", "grit_index"), Some(3.0));
    assert_eq!(table.value("1", "experience_diversity"), Some(2.0));

    assert_eq!(table.value("2", "clinical_total_hours"), Some(200.0));
    assert_eq!(table.value("2", "direct_care_ratio"), Some(0.8));
    assert_eq!(table.value("3", "community_engaged_ratio"), Some(0.0));
}

#[test]
fn unscored_rubric_dimensions_use_the_sentinel() {
    let rubric = rubric();
    let (_, table) = FeaturePipeline::new()
        .fit_transform(&training(), Some(&rubric))
        .unwrap();

    assert_eq!(table.value("1", "writing_quality"), Some(3.0));
    assert_eq!(table.value("1", "adversity_resilience"), Some(UNSCORED_RUBRIC));
    assert_eq!(table.value("1", RUBRIC_SCORED_FLAG), Some(1.0));
    assert_eq!(table.value("2", "writing_quality"), Some(UNSCORED_RUBRIC));
    assert_eq!(table.value("2", RUBRIC_SCORED_FLAG), Some(0.0));
    assert_eq!(table.value("3", RUBRIC_SCORED_FLAG), Some(0.0));
}

#[test]
fn rubric_scores_do_not_change_fitted_state() {
    let without = FeaturePipeline::new().fit(&training(), None).unwrap();
    let with = FeaturePipeline::new().fit(&training(), Some(&rubric())).unwrap();
    assert_eq!(without.imputation_values, with.imputation_values);
    assert_eq!(without.encoding_tables, with.encoding_tables);
    assert_eq!(without.fitted_on_signature, with.fitted_on_signature);
}

#[test]
fn fit_then_transform_equals_fit_transform() {
    let pipeline = FeaturePipeline::new();
    let rubric = rubric();
    let fitted = pipeline.fit(&training(), Some(&rubric)).unwrap();
    let separate = FeaturePipeline::transform(&training(), &fitted, Some(&rubric));
    let (fitted_once, combined) = pipeline.fit_transform(&training(), Some(&rubric)).unwrap();

    assert_eq!(fitted, fitted_once);
    assert_eq!(separate, combined);
}

#[test]
fn feature_table_frame_starts_with_the_id() {
    let (fitted, table) = FeaturePipeline::new().fit_transform(&training(), None).unwrap();
    let frame = table.to_frame().unwrap();

    assert_eq!(frame.width(), fitted.feature_columns.len() + 1);
    assert_eq!(frame.get_column_names()[0].as_str(), "amcas_id");
    assert_eq!(frame.height(), 3);
}

fn arbitrary_record() -> impl Strategy<Value = ApplicantRecord> {
    (
        0u32..10_000,
        proptest::option::of(0.0f64..5_000.0),
        proptest::option::of(any::<bool>()),
        proptest::option::of(prop::sample::select(vec!["Upward", "Stable", "Downward", "Flat"])),
    )
        .prop_map(|(id, hours, pell, trend)| {
            let mut record = ApplicantRecord::new(id.to_string());
            if let Some(hours) = hours {
                record = record.with_numeric("exp_hour_total", hours);
            }
            if let Some(pell) = pell {
                record = record.with_binary("pell_grant", pell);
            }
            if let Some(trend) = trend {
                record = record.with_category("gpa_trend", trend);
            }
            record
        })
}

proptest! {
    #[test]
    fn transform_is_deterministic(records in prop::collection::vec(arbitrary_record(), 1..40)) {
        let dataset = ApplicantDataset::new(records);
        let fitted = FeaturePipeline::new().fit(&dataset, None).unwrap();
        let first = fitted.transform(&dataset, None);
        let second = fitted.transform(&dataset, None);

        prop_assert_eq!(first.columns(), fitted.feature_columns.as_slice());
        prop_assert_eq!(first.height(), dataset.len());
        prop_assert_eq!(&first, &second);
        for row in first.rows() {
            prop_assert!(row.iter().all(|value| value.is_finite()));
        }
    }
}

#[test]
fn signature_identifies_the_training_data() {
    let fitted = FeaturePipeline::new().fit(&training(), None).unwrap();
    assert_eq!(fitted.fitted_on_signature, training().signature());
    assert_eq!(fitted.fitted_on_signature.len(), 64);

    let other = ApplicantDataset::new(vec![
        ApplicantRecord::new("9").with_numeric("exp_hour_total", 1.0),
    ]);
    assert_ne!(other.signature(), training().signature());
}
