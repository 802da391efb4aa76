use polars::prelude::*;
use proptest::prelude::*;

use triage_map::{ColumnReconciler, canonical_frame, header_similarity};
use triage_model::{FileType, MatchMethod};
use triage_standards::{CanonicalTarget, TargetRole, TriageConfig};

fn target(name: &str, role: TargetRole, aliases: &[&str]) -> CanonicalTarget {
    CanonicalTarget {
        name: name.to_string(),
        file_type: FileType::Applicants,
        role,
        aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
    }
}

fn applicant_targets() -> Vec<CanonicalTarget> {
    vec![
        target("amcas_id", TargetRole::JoinKey, &["AMCAS ID"]),
        target("exp_hour_research", TargetRole::Feature, &[]),
        target("exp_hour_volunteer_med", TargetRole::Feature, &[]),
        target("exp_hour_volunteer_non_med", TargetRole::Feature, &[]),
        target("pell_grant", TargetRole::Feature, &["Pell Grant"]),
    ]
}

#[test]
fn exact_join_key_match_after_normalization() {
    let reconciler = ColumnReconciler::default();
    let headers = ["AMCAS ID", "Pell Grant"];
    let rec = reconciler.reconcile(FileType::Applicants, &headers, &applicant_targets());

    let join_key = rec.join_key().expect("join key target");
    assert_eq!(join_key.method, MatchMethod::Exact);
    assert_eq!(join_key.confidence, 1.0);
    assert_eq!(rec.join_key_column(), Some("AMCAS ID"));
    assert_eq!(rec.raw_for("pell_grant"), Some("Pell Grant"));
}

#[test]
fn misspelled_header_matches_fuzzily_above_threshold() {
    let reconciler = ColumnReconciler::default();
    let headers = ["amcas_id", "Exp Hour Resarch"];
    let rec = reconciler.reconcile(FileType::Applicants, &headers, &applicant_targets());

    let research = rec.match_for("exp_hour_research").expect("target present");
    assert_eq!(research.method, MatchMethod::Fuzzy);
    assert_eq!(research.matched_raw_name.as_deref(), Some("Exp Hour Resarch"));
    assert!(research.confidence >= 0.85);
    assert!(research.confidence < 1.0);
    assert_eq!(rec.fuzzy_matches().count(), 1);
}

#[test]
fn dissimilar_header_stays_unmatched() {
    let reconciler = ColumnReconciler::default();
    let headers = ["amcas_id", "research hrs"];
    let rec = reconciler.reconcile(FileType::Applicants, &headers, &applicant_targets());

    let research = rec.match_for("exp_hour_research").expect("target present");
    assert_eq!(research.method, MatchMethod::Unmatched);
    assert_eq!(research.matched_raw_name, None);
    assert_eq!(rec.unmatched_headers(), ["research hrs".to_string()]);
}

#[test]
fn exact_matches_are_assigned_before_fuzzy_ones() {
    let reconciler = ColumnReconciler::default();
    let headers = ["amcas_id", "exp_hour_volunteer_non_med"];
    let rec = reconciler.reconcile(FileType::Applicants, &headers, &applicant_targets());

    assert_eq!(
        rec.raw_for("exp_hour_volunteer_non_med"),
        Some("exp_hour_volunteer_non_med")
    );
    assert_eq!(rec.raw_for("exp_hour_volunteer_med"), None);
}

#[test]
fn missing_join_key_is_reported_as_unmatched() {
    let reconciler = ColumnReconciler::default();
    let headers = ["applicant", "pell_grant"];
    let rec = reconciler.reconcile(FileType::Applicants, &headers, &applicant_targets());

    assert_eq!(rec.join_key_column(), None);
    assert_eq!(rec.role_of("amcas_id"), Some(TargetRole::JoinKey));
}

#[test]
fn feature_coverage_counts_only_feature_targets() {
    let reconciler = ColumnReconciler::default();
    let headers = ["amcas_id", "exp_hour_research", "exp_hour_volunteer_med", "pell_grant"];
    let rec = reconciler.reconcile(FileType::Applicants, &headers, &applicant_targets());

    let coverage = rec.feature_coverage();
    assert_eq!(coverage.requested, 4);
    assert_eq!(coverage.matched, 3);
    assert_eq!(coverage.missing, vec!["exp_hour_volunteer_non_med".to_string()]);
    assert!((coverage.missing_fraction() - 0.25).abs() < 1e-12);
}

#[test]
fn similarity_is_symmetric_and_bounded() {
    assert_eq!(header_similarity("amcas_id", "amcas_id"), 1.0);
    let forward = header_similarity("amcas_id", "amcas_ids");
    let backward = header_similarity("amcas_ids", "amcas_id");
    assert!((forward - backward).abs() < 1e-12);
    assert!(forward > 0.8 && forward < 1.0);
}

#[test]
fn canonical_frame_renames_resolved_columns() {
    let df = DataFrame::new(vec![
        Column::new("AMCAS ID".into(), ["1", "2"]),
        Column::new("Pell Grant".into(), ["Yes", "No"]),
        Column::new("Unrelated".into(), [1i64, 2]),
    ])
    .unwrap();
    let headers: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let rec = ColumnReconciler::default().reconcile(
        FileType::Applicants,
        &headers,
        &applicant_targets(),
    );

    let canonical = canonical_frame(&df, &rec).unwrap();
    let names: Vec<String> = canonical
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["amcas_id".to_string(), "pell_grant".to_string()]);
    assert_eq!(canonical.height(), 2);
}

fn registered_names(file_type: FileType) -> Vec<String> {
    let config = TriageConfig::default_config().unwrap();
    config
        .targets_for(file_type)
        .into_iter()
        .map(|target| target.name)
        .collect()
}

fn restyle(name: &str, style: u8) -> String {
    match style % 3 {
        0 => name.to_string(),
        1 => name.to_uppercase(),
        _ => name.replace('_', " "),
    }
}

proptest! {
    #[test]
    fn canonical_headers_reconcile_exactly(
        file_idx in 0usize..FileType::ALL.len(),
        style in any::<u8>(),
        seed in any::<u64>(),
    ) {
        let file_type = FileType::ALL[file_idx];
        let config = TriageConfig::default_config().unwrap();
        let targets = config.targets_for(file_type);
        let mut headers: Vec<String> = registered_names(file_type)
            .iter()
            .map(|name| restyle(name, style))
            .collect();
        let shift = (seed as usize) % headers.len();
        headers.rotate_left(shift);

        let rec = ColumnReconciler::from_config(&config.matching)
            .reconcile(file_type, &headers, &targets);

        for column_match in rec.matches() {
            prop_assert_eq!(column_match.method, MatchMethod::Exact);
            prop_assert_eq!(column_match.confidence, 1.0);
        }
        prop_assert!(rec.unmatched_headers().is_empty());
    }
}
