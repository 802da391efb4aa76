use serde::{Deserialize, Serialize};

/// How a canonical target was resolved to a raw header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Fuzzy,
    Unmatched,
}

/// Resolution of one canonical target against the raw headers of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMatch {
    pub target_name: String,
    pub matched_raw_name: Option<String>,
    /// 1.0 for an exact normalized match, the similarity score for fuzzy matches.
    pub confidence: f64,
    pub method: MatchMethod,
}

impl ColumnMatch {
    pub fn exact(target: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            target_name: target.into(),
            matched_raw_name: Some(raw.into()),
            confidence: 1.0,
            method: MatchMethod::Exact,
        }
    }

    pub fn fuzzy(target: impl Into<String>, raw: impl Into<String>, confidence: f64) -> Self {
        Self {
            target_name: target.into(),
            matched_raw_name: Some(raw.into()),
            confidence,
            method: MatchMethod::Fuzzy,
        }
    }

    pub fn unmatched(target: impl Into<String>) -> Self {
        Self {
            target_name: target.into(),
            matched_raw_name: None,
            confidence: 0.0,
            method: MatchMethod::Unmatched,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched_raw_name.is_some()
    }
}
