//! Tests for configuration loading and merging.

use std::io::Write;

use triage_model::FileType;
use triage_standards::{BoundKind, StandardsError, TargetRole, TriageConfig};

#[test]
fn builtin_registry_covers_every_file_type() {
    let config = TriageConfig::default_config().expect("built-in registry");
    for file_type in FileType::ALL {
        assert!(
            config.file_type_spec(file_type).is_some(),
            "missing spec for {file_type}"
        );
    }
    assert_eq!(config.join_key.name, "amcas_id");
    assert!((config.matching.join_key_threshold - 0.80).abs() < f64::EPSILON);
    assert!((config.matching.feature_threshold - 0.85).abs() < f64::EPSILON);
}

#[test]
fn targets_start_with_join_key() {
    let config = TriageConfig::default_config().expect("built-in registry");
    let targets = config.targets_for(FileType::Languages);
    assert_eq!(targets[0].role, TargetRole::JoinKey);
    assert_eq!(targets[0].file_type, FileType::Languages);
    assert!(targets.iter().any(|t| t.name == "language_desc"));
}

#[test]
fn label_target_registered_for_applicants() {
    let config = TriageConfig::default_config().expect("built-in registry");
    let label = config
        .label_target(FileType::Applicants)
        .expect("label target");
    assert_eq!(label.name, "application_review_score");
    assert!(config.label_target(FileType::Parents).is_none());
}

#[test]
fn review_score_is_bounded_as_an_ordinal_code() {
    let config = TriageConfig::default_config().expect("built-in registry");
    assert_eq!(
        config.bound_kind(FileType::Applicants, "application_review_score"),
        Some(BoundKind::Ordinal)
    );
    let bound = config
        .bounds_for(FileType::Applicants)
        .find(|bound| bound.kind == BoundKind::Ordinal)
        .expect("ordinal bound");
    assert!(bound.hard.contains(25.0));
    assert!(!bound.hard.contains(26.0));
}

#[test]
fn overlay_replaces_only_named_values() {
    let config = TriageConfig::from_toml_str(
        "[matching]\nfeature_threshold = 0.9\n\n[drift]\nhigh_risk_features = [\"num_languages\"]\n",
        "overlay",
    )
    .expect("overlay config");
    assert!((config.matching.feature_threshold - 0.9).abs() < f64::EPSILON);
    assert!((config.matching.join_key_threshold - 0.80).abs() < f64::EPSILON);
    assert_eq!(config.drift.high_risk_features, vec!["num_languages".to_string()]);
    assert!(config.drift.is_high_risk("NUM_LANGUAGES"));
    assert!(!config.targets.is_empty());
}

#[test]
fn inconsistent_row_range_is_rejected() {
    let overlay = r#"
[[file_types]]
file_type = "applicants"
rows = { min = 900, expected_min = 800, expected_max = 2000, max = 20000 }
columns = { min = 2, max = 400 }
"#;
    let error = TriageConfig::from_toml_str(overlay, "overlay").expect_err("must reject");
    assert!(matches!(error, StandardsError::InvalidConfig { .. }));
}

#[test]
fn threshold_out_of_range_is_rejected() {
    let error = TriageConfig::from_toml_str("[matching]\njoin_key_threshold = 1.5\n", "overlay")
        .expect_err("must reject");
    assert!(error.to_string().contains("join_key_threshold"));
}

#[test]
fn malformed_document_reports_origin() {
    let error = TriageConfig::from_toml_str("[matching\n", "broken.toml").expect_err("parse");
    match error {
        StandardsError::ConfigParse { origin, .. } => assert_eq!(origin, "broken.toml"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_reads_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[store]\ndirectory = \"/tmp/fitted\"").expect("write config");
    let config = TriageConfig::load(file.path()).expect("load config");
    assert_eq!(config.store.directory, std::path::PathBuf::from("/tmp/fitted"));
}

#[test]
fn missing_file_is_read_error() {
    let error = TriageConfig::load(std::path::Path::new("/nonexistent/triage.toml"))
        .expect_err("missing");
    assert!(matches!(error, StandardsError::ConfigRead { .. }));
}
