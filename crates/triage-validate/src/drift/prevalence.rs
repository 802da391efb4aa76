//! Prevalence shifts of binary indicators.

use serde::Serialize;

use triage_model::{Category, ValidationMessage};
use triage_standards::DriftThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrevalencePattern {
    /// Never set in the reference cohort, now set for a noticeable share.
    EmergedFromZero,
    /// Balanced in the reference cohort, now (almost) constant.
    LostBalance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrevalenceShift {
    pub feature: String,
    pub pattern: PrevalencePattern,
    pub reference_rate: f64,
    pub current_rate: f64,
}

impl PrevalenceShift {
    pub fn message(&self) -> ValidationMessage {
        let text = match self.pattern {
            PrevalencePattern::EmergedFromZero => format!(
                "{} was never set in the reference cohort but is set for {:.1}% now",
                self.feature,
                self.current_rate * 100.0
            ),
            PrevalencePattern::LostBalance => format!(
                "{} moved from {:.1}% to {:.1}% positive",
                self.feature,
                self.reference_rate * 100.0,
                self.current_rate * 100.0
            ),
        };
        ValidationMessage::warning(Category::Drift, "prevalence_shift", text)
            .with_detail("feature", self.feature.clone())
            .with_detail("reference_rate", self.reference_rate)
            .with_detail("current_rate", self.current_rate)
            .with_recommendation("Check whether the coding of this indicator changed")
    }
}

/// Share of positive values.
pub fn positive_rate(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| **v > 0.0).count() as f64 / values.len() as f64
}

/// Compare positive rates of a binary feature across cohorts.
pub fn check_prevalence(
    feature: &str,
    reference: &[f64],
    current: &[f64],
    thresholds: &DriftThresholds,
) -> Option<PrevalenceShift> {
    let reference_rate = positive_rate(reference);
    let current_rate = positive_rate(current);

    let pattern = if reference_rate == 0.0 && current_rate > thresholds.zero_prevalence_rate {
        PrevalencePattern::EmergedFromZero
    } else if (thresholds.balanced_min..=thresholds.balanced_max).contains(&reference_rate)
        && (current_rate > thresholds.extreme_high || current_rate < thresholds.extreme_low)
    {
        PrevalencePattern::LostBalance
    } else {
        return None;
    };

    Some(PrevalenceShift {
        feature: feature.to_string(),
        pattern,
        reference_rate,
        current_rate,
    })
}
