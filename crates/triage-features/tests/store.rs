//! Versioned persistence of fitted pipelines.

use tempfile::tempdir;

use triage_features::{
    ApplicantDataset, ApplicantRecord, FeatureError, FeaturePipeline, FittedFeaturePipeline,
    PipelineStore, STORE_SCHEMA_VERSION,
};

fn fitted() -> FittedFeaturePipeline {
    let dataset = ApplicantDataset::new(vec![
        ApplicantRecord::new("1")
            .with_numeric("exp_hour_total", 120.0)
            .with_category("gpa_trend", "Upward"),
        ApplicantRecord::new("2")
            .with_numeric("exp_hour_total", 80.0)
            .with_category("gpa_trend", "Stable"),
    ]);
    FeaturePipeline::new().fit(&dataset, None).unwrap()
}

#[test]
fn saved_version_loads_back() {
    let dir = tempdir().unwrap();
    let store = PipelineStore::new(dir.path().join("pipelines"));
    let pipeline = fitted();

    let saved = store.save("2025.1", &pipeline).unwrap();
    assert_eq!(saved.schema_version, STORE_SCHEMA_VERSION);
    assert!(store.contains("2025.1"));

    let loaded = store.load("2025.1").unwrap();
    assert_eq!(loaded.version, "2025.1");
    assert_eq!(loaded.pipeline.fitted_on_signature.len(), 64);
    assert_eq!(loaded.pipeline, pipeline);
    assert_eq!(loaded.pipeline.median("exp_hour_total"), Some(100.0));
}

#[test]
fn missing_version_is_not_fitted() {
    let dir = tempdir().unwrap();
    let store = PipelineStore::new(dir.path());
    store.save("v1", &fitted()).unwrap();

    let err = store.load("v2").unwrap_err();
    assert!(matches!(err, FeatureError::NotFitted { ref version, .. } if version == "v2"));
    assert!(err.to_string().contains("no fitted pipeline found"));
}

#[test]
fn existing_versions_are_never_overwritten() {
    let dir = tempdir().unwrap();
    let store = PipelineStore::new(dir.path());
    let first = store.save("v1", &fitted()).unwrap();

    let err = store.save("v1", &fitted()).unwrap_err();
    assert!(matches!(err, FeatureError::VersionExists { .. }));
    assert_eq!(store.load("v1").unwrap().fitted_at, first.fitted_at);
}

#[test]
fn versions_are_listed_in_order() {
    let dir = tempdir().unwrap();
    let store = PipelineStore::new(dir.path());
    assert!(store.versions().unwrap().is_empty());

    store.save("b", &fitted()).unwrap();
    store.save("a", &fitted()).unwrap();
    assert_eq!(store.versions().unwrap(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn path_like_versions_are_rejected() {
    let dir = tempdir().unwrap();
    let store = PipelineStore::new(dir.path());
    for version in ["", "../escape", "a/b", ".hidden"] {
        assert!(matches!(
            store.save(version, &fitted()),
            Err(FeatureError::InvalidVersion { .. })
        ));
    }
}

#[test]
fn concurrent_saves_of_one_version_admit_exactly_one() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let pipeline = fitted();

    let outcomes: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = PipelineStore::new(root.clone());
                let pipeline = &pipeline;
                scope.spawn(move || store.save("shared", pipeline).is_ok())
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|saved| **saved).count(), 1);
}

#[test]
fn unknown_store_layout_is_rejected() {
    let dir = tempdir().unwrap();
    let store = PipelineStore::new(dir.path());
    store.save("v1", &fitted()).unwrap();

    let path = store.path_for("v1");
    let text = std::fs::read_to_string(&path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
    value["schema_version"] = serde_json::json!(99);
    std::fs::write(&path, value.to_string()).unwrap();

    let err = store.load("v1").unwrap_err();
    assert!(matches!(
        err,
        FeatureError::UnsupportedSchema { found: 99, expected: 1, .. }
    ));
}
