//! Training/scoring mode detection from the label column.

use polars::prelude::DataFrame;

use triage_map::Reconciliation;
use triage_model::{Category, DataMode, ValidationMessage};
use triage_standards::StructuralConfig;

use crate::checks::null_mask;

/// Detected mode and the label coverage it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataModeOutcome {
    pub mode: DataMode,
    /// Fraction of rows with a label; zero when the label column is absent.
    pub label_coverage: f64,
}

impl DataModeOutcome {
    /// A partially labelled cohort cannot be trained on or scored as a whole.
    pub fn message(&self) -> Option<ValidationMessage> {
        if self.mode != DataMode::Mixed {
            return None;
        }
        Some(
            ValidationMessage::error(
                Category::DataQuality,
                "mixed_data_mode",
                format!(
                    "review scores are present for {:.1}% of applicants; expected all or none",
                    self.label_coverage * 100.0
                ),
            )
            .with_detail("label_coverage", self.label_coverage)
            .with_recommendation(
                "Upload either a fully scored training cohort or an unscored cohort",
            ),
        )
    }
}

/// Classify a primary file by how many rows carry the label.
///
/// `label` is the canonical label target; when it was not resolved the cycle
/// is a scoring cycle.
pub fn detect_data_mode(
    df: &DataFrame,
    reconciliation: &Reconciliation,
    label: Option<&str>,
    config: &StructuralConfig,
) -> DataModeOutcome {
    let column = label
        .and_then(|label| reconciliation.raw_for(label))
        .and_then(|raw| df.column(raw).ok());
    let label_coverage = match column {
        Some(column) if df.height() > 0 => {
            let present = null_mask(column).iter().filter(|is_null| !**is_null).count();
            present as f64 / df.height() as f64
        }
        _ => 0.0,
    };

    let mode = if label_coverage == 0.0 {
        DataMode::Scoring
    } else if label_coverage >= config.training_label_coverage {
        DataMode::Training
    } else {
        DataMode::Mixed
    };
    DataModeOutcome {
        mode,
        label_coverage,
    }
}
