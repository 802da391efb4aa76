//! Column reconciliation engine.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rapidfuzz::distance::indel;
use serde::Serialize;
use tracing::debug;

use triage_model::{ColumnMatch, FileType, MatchMethod, normalize_header};
use triage_standards::{CanonicalTarget, MatchingConfig, TargetRole};

/// Similarity of two normalized headers in `0.0..=1.0`.
///
/// Normalized Indel similarity: twice the longest common subsequence over the
/// combined length.
pub fn header_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Feature-target coverage of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCoverage {
    pub requested: usize,
    pub matched: usize,
    pub missing: Vec<String>,
}

impl FeatureCoverage {
    /// Fraction of requested feature targets that were not matched.
    pub fn missing_fraction(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            self.missing.len() as f64 / self.requested as f64
        }
    }
}

/// Outcome of reconciling one file's headers.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    file_type: FileType,
    targets: Vec<CanonicalTarget>,
    matches: Vec<ColumnMatch>,
    unmatched_headers: Vec<String>,
}

impl Reconciliation {
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// One match per target, in target order.
    pub fn matches(&self) -> &[ColumnMatch] {
        &self.matches
    }

    /// Raw headers not claimed by any target, in file order.
    pub fn unmatched_headers(&self) -> &[String] {
        &self.unmatched_headers
    }

    pub fn join_key(&self) -> Option<&ColumnMatch> {
        self.targets
            .iter()
            .zip(self.matches.iter())
            .find(|(target, _)| target.role == TargetRole::JoinKey)
            .map(|(_, column_match)| column_match)
    }

    /// Raw header resolved for the join key.
    pub fn join_key_column(&self) -> Option<&str> {
        self.join_key()
            .and_then(|column_match| column_match.matched_raw_name.as_deref())
    }

    pub fn match_for(&self, target: &str) -> Option<&ColumnMatch> {
        self.matches
            .iter()
            .find(|column_match| column_match.target_name.eq_ignore_ascii_case(target))
    }

    /// Raw header resolved for a canonical target.
    pub fn raw_for(&self, target: &str) -> Option<&str> {
        self.match_for(target)
            .and_then(|column_match| column_match.matched_raw_name.as_deref())
    }

    pub fn role_of(&self, target: &str) -> Option<TargetRole> {
        self.targets
            .iter()
            .find(|candidate| candidate.name.eq_ignore_ascii_case(target))
            .map(|candidate| candidate.role)
    }

    /// Matched (canonical, raw) pairs in target order.
    pub fn resolved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.matches.iter().filter_map(|column_match| {
            column_match
                .matched_raw_name
                .as_deref()
                .map(|raw| (column_match.target_name.as_str(), raw))
        })
    }

    pub fn fuzzy_matches(&self) -> impl Iterator<Item = &ColumnMatch> {
        self.matches
            .iter()
            .filter(|column_match| column_match.method == MatchMethod::Fuzzy)
    }

    pub fn feature_coverage(&self) -> FeatureCoverage {
        let mut requested = 0;
        let mut missing = Vec::new();
        for (target, column_match) in self.targets.iter().zip(self.matches.iter()) {
            if target.role != TargetRole::Feature {
                continue;
            }
            requested += 1;
            if !column_match.is_matched() {
                missing.push(target.name.clone());
            }
        }
        FeatureCoverage {
            requested,
            matched: requested - missing.len(),
            missing,
        }
    }
}

/// Resolves raw headers against canonical targets.
///
/// Exact normalized matches are assigned first. Remaining targets are matched
/// by similarity, best score first, and only above the threshold for the
/// target's role. A raw header is claimed by at most one target.
#[derive(Debug, Clone, Copy)]
pub struct ColumnReconciler {
    join_key_threshold: f64,
    feature_threshold: f64,
}

impl Default for ColumnReconciler {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default())
    }
}

struct Candidate {
    target_idx: usize,
    header_idx: usize,
    score: f64,
}

impl ColumnReconciler {
    pub fn new(join_key_threshold: f64, feature_threshold: f64) -> Self {
        Self {
            join_key_threshold,
            feature_threshold,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.join_key_threshold, config.feature_threshold)
    }

    pub fn threshold_for(&self, role: TargetRole) -> f64 {
        match role {
            TargetRole::JoinKey => self.join_key_threshold,
            TargetRole::Label | TargetRole::Feature | TargetRole::Attribute => {
                self.feature_threshold
            }
        }
    }

    pub fn reconcile<S: AsRef<str>>(
        &self,
        file_type: FileType,
        headers: &[S],
        targets: &[CanonicalTarget],
    ) -> Reconciliation {
        let normalized_headers: Vec<String> = headers
            .iter()
            .map(|header| normalize_header(header.as_ref()))
            .collect();
        let target_aliases: Vec<BTreeSet<String>> = targets.iter().map(alias_set).collect();

        let mut assignments: Vec<Option<(usize, f64, MatchMethod)>> = vec![None; targets.len()];
        let mut claimed = vec![false; headers.len()];

        for (target_idx, aliases) in target_aliases.iter().enumerate() {
            let exact = normalized_headers
                .iter()
                .enumerate()
                .find(|(header_idx, normalized)| {
                    !claimed[*header_idx] && !normalized.is_empty() && aliases.contains(*normalized)
                })
                .map(|(header_idx, _)| header_idx);
            if let Some(header_idx) = exact {
                claimed[header_idx] = true;
                assignments[target_idx] = Some((header_idx, 1.0, MatchMethod::Exact));
            }
        }

        let mut candidates = Vec::new();
        for (target_idx, target) in targets.iter().enumerate() {
            if assignments[target_idx].is_some() {
                continue;
            }
            let threshold = self.threshold_for(target.role);
            for (header_idx, normalized) in normalized_headers.iter().enumerate() {
                if claimed[header_idx] || normalized.is_empty() {
                    continue;
                }
                let score = target_aliases[target_idx]
                    .iter()
                    .map(|alias| header_similarity(alias, normalized))
                    .fold(0.0_f64, f64::max);
                if score >= threshold {
                    candidates.push(Candidate {
                        target_idx,
                        header_idx,
                        score,
                    });
                }
            }
        }
        // Stable sort keeps target order, then header order, among equal scores.
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        for candidate in candidates {
            if assignments[candidate.target_idx].is_some() || claimed[candidate.header_idx] {
                continue;
            }
            claimed[candidate.header_idx] = true;
            assignments[candidate.target_idx] =
                Some((candidate.header_idx, candidate.score, MatchMethod::Fuzzy));
        }

        let matches: Vec<ColumnMatch> = targets
            .iter()
            .zip(assignments)
            .map(|(target, assignment)| match assignment {
                Some((header_idx, _, MatchMethod::Exact)) => {
                    ColumnMatch::exact(&target.name, headers[header_idx].as_ref())
                }
                Some((header_idx, score, _)) => {
                    ColumnMatch::fuzzy(&target.name, headers[header_idx].as_ref(), score)
                }
                None => ColumnMatch::unmatched(&target.name),
            })
            .collect();
        let unmatched_headers = headers
            .iter()
            .zip(claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(header, _)| header.as_ref().to_string())
            .collect();

        debug!(
            file_type = %file_type,
            targets = targets.len(),
            matched = matches.iter().filter(|m| m.is_matched()).count(),
            "reconciled columns"
        );

        Reconciliation {
            file_type,
            targets: targets.to_vec(),
            matches,
            unmatched_headers,
        }
    }
}

fn alias_set(target: &CanonicalTarget) -> BTreeSet<String> {
    std::iter::once(target.name.as_str())
        .chain(target.aliases.iter().map(String::as_str))
        .map(normalize_header)
        .filter(|alias| !alias.is_empty())
        .collect()
}
