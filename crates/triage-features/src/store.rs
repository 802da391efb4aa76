//! Versioned storage of fitted pipelines.
//!
//! Each version is one JSON file, `pipeline-<version>.json`, inside the store
//! directory. Saves take an exclusive advisory lock on `.store.lock`, refuse to
//! replace an existing version, and write through a temp file and rename.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use triage_standards::StoreConfig;

use crate::error::{FeatureError, Result};
use crate::pipeline::FittedFeaturePipeline;

/// Layout version of stored pipeline files.
pub const STORE_SCHEMA_VERSION: u32 = 1;

const LOCK_FILE: &str = ".store.lock";
const FILE_PREFIX: &str = "pipeline-";
const FILE_SUFFIX: &str = ".json";

/// A fitted pipeline with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPipeline {
    pub schema_version: u32,
    pub version: String,
    pub fitted_at: DateTime<Utc>,
    pub pipeline: FittedFeaturePipeline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStore {
    root: PathBuf,
}

impl PipelineStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.directory.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, version: &str) -> PathBuf {
        self.root
            .join(format!("{FILE_PREFIX}{version}{FILE_SUFFIX}"))
    }

    pub fn contains(&self, version: &str) -> bool {
        self.path_for(version).is_file()
    }

    /// Persists `pipeline` as `version`. Never overwrites.
    pub fn save(&self, version: &str, pipeline: &FittedFeaturePipeline) -> Result<StoredPipeline> {
        check_version(version)?;
        fs::create_dir_all(&self.root).map_err(|e| FeatureError::Io {
            operation: "create directory",
            path: self.root.clone(),
            source: e,
        })?;
        let _lock = self.lock()?;

        let path = self.path_for(version);
        if path.exists() {
            return Err(FeatureError::VersionExists {
                version: version.to_string(),
                path,
            });
        }

        let stored = StoredPipeline {
            schema_version: STORE_SCHEMA_VERSION,
            version: version.to_string(),
            fitted_at: Utc::now(),
            pipeline: pipeline.clone(),
        };
        let bytes =
            serde_json::to_vec_pretty(&stored).map_err(|e| FeatureError::Serialization {
                path: path.clone(),
                source: e,
            })?;
        write_atomic(&path, &bytes)?;

        info!(
            version,
            path = %path.display(),
            features = pipeline.feature_columns.len(),
            "saved fitted pipeline"
        );
        Ok(stored)
    }

    /// Loads exactly `version`; there is no fallback to another version.
    pub fn load(&self, version: &str) -> Result<StoredPipeline> {
        check_version(version)?;
        let path = self.path_for(version);
        if !path.is_file() {
            warn!(version, store = %self.root.display(), "no fitted pipeline found");
            return Err(FeatureError::NotFitted {
                version: version.to_string(),
                directory: self.root.clone(),
            });
        }
        let text = fs::read_to_string(&path).map_err(|e| FeatureError::Io {
            operation: "read",
            path: path.clone(),
            source: e,
        })?;
        let stored: StoredPipeline =
            serde_json::from_str(&text).map_err(|e| FeatureError::Serialization {
                path: path.clone(),
                source: e,
            })?;
        if stored.schema_version != STORE_SCHEMA_VERSION {
            return Err(FeatureError::UnsupportedSchema {
                path,
                found: stored.schema_version,
                expected: STORE_SCHEMA_VERSION,
            });
        }
        info!(version, path = %path.display(), "loaded fitted pipeline");
        Ok(stored)
    }

    /// Stored versions in sorted order.
    pub fn versions(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root).map_err(|e| FeatureError::Io {
            operation: "list",
            path: self.root.clone(),
            source: e,
        })?;
        let mut versions: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_prefix(FILE_PREFIX)?
                    .strip_suffix(FILE_SUFFIX)
                    .map(str::to_string)
            })
            .collect();
        versions.sort();
        Ok(versions)
    }

    /// Held until dropped; closing the file releases the lock.
    fn lock(&self) -> Result<File> {
        let path = self.root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| FeatureError::Io {
                operation: "open",
                path: path.clone(),
                source: e,
            })?;
        FileExt::lock_exclusive(&file).map_err(|e| FeatureError::Lock { path, source: e })?;
        Ok(file)
    }
}

fn check_version(version: &str) -> Result<()> {
    let valid = !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        && !version.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(FeatureError::InvalidVersion {
            version: version.to_string(),
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|e| FeatureError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| FeatureError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| FeatureError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;
    fs::rename(&temp_path, path).map_err(|e| FeatureError::Io {
        operation: "rename",
        path: path.to_path_buf(),
        source: e,
    })
}
