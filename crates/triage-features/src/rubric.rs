//! Rubric scores produced by the essay reviewers.
//!
//! Two layouts are accepted:
//!
//! ```text
//! {"10001": {"scores": {"writing_quality": 3, ...}, "details": {...}}}
//! {"10001": {"writing_quality": 3, ...}}
//! ```
//!
//! A score of zero or below means the dimension was not scored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use polars::prelude::AnyValue;
use serde_json::Value;
use tracing::info;

use triage_ingest::canonical_key;

use crate::error::{FeatureError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RubricScores {
    scores: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RubricScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FeatureError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        })?;
        let scores = Self::from_json_str(&text, &path.display().to_string())?;
        info!(
            path = %path.display(),
            applicants = scores.len(),
            "loaded rubric scores"
        );
        Ok(scores)
    }

    pub fn from_json_str(text: &str, origin: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| FeatureError::Rubric {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
        let Value::Object(applicants) = value else {
            return Err(FeatureError::Rubric {
                origin: origin.to_string(),
                reason: "expected an object keyed by applicant id".to_string(),
            });
        };

        let mut rubric = Self::new();
        for (id, record) in applicants {
            let dimensions = match record.get("scores") {
                Some(Value::Object(nested)) => nested,
                _ => match &record {
                    Value::Object(flat) => flat,
                    _ => {
                        return Err(FeatureError::Rubric {
                            origin: origin.to_string(),
                            reason: format!("record for applicant '{id}' is not an object"),
                        });
                    }
                },
            };
            for (dimension, score) in dimensions {
                if let Some(score) = score.as_f64() {
                    rubric.insert(&id, dimension, score);
                }
            }
        }
        Ok(rubric)
    }

    /// Records a score; the applicant id is canonicalized like a join key.
    pub fn insert(&mut self, amcas_id: &str, dimension: &str, score: f64) {
        let key = canonical_key(AnyValue::String(amcas_id)).unwrap_or_default();
        self.scores
            .entry(key)
            .or_default()
            .insert(dimension.to_string(), score);
    }

    /// The score for one dimension, if it was scored.
    pub fn score(&self, amcas_id: &str, dimension: &str) -> Option<f64> {
        self.scores
            .get(amcas_id)?
            .get(dimension)
            .copied()
            .filter(|score| *score > 0.0)
    }

    pub fn is_scored(&self, amcas_id: &str) -> bool {
        self.scores
            .get(amcas_id)
            .is_some_and(|dimensions| dimensions.values().any(|score| *score > 0.0))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
