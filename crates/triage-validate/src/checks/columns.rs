//! Join-key presence, feature coverage and fuzzy-match reporting.

use triage_map::Reconciliation;
use triage_model::{Category, ValidationMessage};
use triage_standards::MatchingConfig;

/// Check the outcome of column reconciliation.
///
/// The caller stops checking a file when this returns `join_key_missing`.
pub fn check(reconciliation: &Reconciliation, config: &MatchingConfig) -> Vec<ValidationMessage> {
    let file_type = reconciliation.file_type();
    let mut messages = Vec::new();

    if reconciliation.join_key_column().is_none() {
        messages.push(
            ValidationMessage::error(
                Category::Schema,
                "join_key_missing",
                format!("{file_type} has no applicant identifier column"),
            )
            .for_file(file_type)
            .with_detail(
                "unmatched_headers",
                reconciliation.unmatched_headers().to_vec(),
            )
            .with_recommendation("Check that the export includes the AMCAS ID column"),
        );
        return messages;
    }

    let coverage = reconciliation.feature_coverage();
    let missing_fraction = coverage.missing_fraction();
    if missing_fraction > 0.0 {
        let message = format!(
            "{} of {} feature columns not found in {file_type}",
            coverage.missing.len(),
            coverage.requested
        );
        let base = if missing_fraction >= config.coverage_error_fraction {
            ValidationMessage::error(Category::Schema, "feature_coverage", message)
        } else {
            ValidationMessage::warning(Category::Schema, "feature_coverage", message)
        };
        messages.push(
            base.for_file(file_type)
                .with_detail("missing", coverage.missing.clone())
                .with_detail("missing_fraction", missing_fraction)
                .with_detail("requested", coverage.requested),
        );
    }

    for column_match in reconciliation.fuzzy_matches() {
        let raw = column_match.matched_raw_name.as_deref().unwrap_or_default();
        messages.push(
            ValidationMessage::info(
                Category::Schema,
                "fuzzy_column_match",
                format!(
                    "'{raw}' matched to {} with confidence {:.2}",
                    column_match.target_name, column_match.confidence
                ),
            )
            .for_file(file_type)
            .with_detail("target", column_match.target_name.clone())
            .with_detail("raw", raw)
            .with_detail("confidence", column_match.confidence),
        );
    }

    messages
}
