//! Distribution drift between a reference cohort and a new cohort.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use triage_ingest::{column_numbers, column_strings, format_numeric};
use triage_model::{Category, Severity, ValidationMessage};
use triage_standards::DriftThresholds;

use super::prevalence::{PrevalenceShift, check_prevalence};
use super::stats::{
    TestOutcome, chi_square_two_sample, cohens_d, cramers_v, ks_two_sample, mean_variance,
};
use crate::checks::ranges::median;
use crate::error::Result;

/// How a feature is tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    Numeric,
    Categorical,
    /// A 0/1 indicator: tested as categorical and screened for prevalence shifts.
    Binary,
}

impl DriftKind {
    fn is_numeric(self) -> bool {
        self == Self::Numeric
    }
}

/// A feature to check for drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftFeature {
    pub name: String,
    pub kind: DriftKind,
}

impl DriftFeature {
    pub fn new(name: impl Into<String>, kind: DriftKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftTest {
    KolmogorovSmirnov,
    ChiSquare,
}

/// Summary of one feature in one cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionSummary {
    Numeric {
        count: usize,
        mean: f64,
        std: f64,
        median: f64,
        min: f64,
        max: f64,
    },
    Categorical {
        count: usize,
        proportions: BTreeMap<String, f64>,
    },
}

/// Drift test outcome for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureDrift {
    pub feature: String,
    pub kind: DriftKind,
    pub test_used: DriftTest,
    pub statistic: f64,
    pub p_value: f64,
    pub effect_size: f64,
    pub reference_summary: DistributionSummary,
    pub new_summary: DistributionSummary,
    pub drifted: bool,
    pub high_risk: bool,
}

/// A feature that could not be tested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFeature {
    pub feature: String,
    pub reason: String,
}

/// Drift across all checked features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    pub features: Vec<FeatureDrift>,
    pub skipped: Vec<SkippedFeature>,
    pub prevalence_shifts: Vec<PrevalenceShift>,
    pub drifted_fraction: f64,
    pub severity: Severity,
}

impl DriftReport {
    pub fn drifted(&self) -> impl Iterator<Item = &FeatureDrift> {
        self.features.iter().filter(|feature| feature.drifted)
    }

    pub fn high_risk_hits(&self) -> impl Iterator<Item = &FeatureDrift> {
        self.features.iter().filter(|feature| feature.high_risk)
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureDrift> {
        self.features.iter().find(|feature| feature.feature == name)
    }

    /// Findings as validation messages: the aggregate, each high-risk hit,
    /// each prevalence shift and the skipped features.
    pub fn messages(&self) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();
        let drifted: Vec<String> = self.drifted().map(|f| f.feature.clone()).collect();
        let text = format!(
            "{} of {} features drifted ({:.1}%)",
            drifted.len(),
            self.features.len(),
            self.drifted_fraction * 100.0
        );
        messages.push(
            ValidationMessage::new(self.severity, Category::Drift, "distribution_drift", text)
                .with_detail("drifted", drifted)
                .with_detail("drifted_fraction", self.drifted_fraction)
                .with_detail("tested", self.features.len()),
        );

        for hit in self.high_risk_hits() {
            messages.push(
                ValidationMessage::error(
                    Category::Drift,
                    "high_risk_drift",
                    format!(
                        "{} shifted strongly (effect {:.2}, p = {:.2e})",
                        hit.feature, hit.effect_size, hit.p_value
                    ),
                )
                .with_detail("feature", hit.feature.clone())
                .with_detail("effect_size", hit.effect_size)
                .with_detail("p_value", hit.p_value)
                .with_recommendation("Retrain or review before scoring with this feature"),
            );
        }

        messages.extend(self.prevalence_shifts.iter().map(PrevalenceShift::message));

        if !self.skipped.is_empty() {
            let names: Vec<String> = self.skipped.iter().map(|s| s.feature.clone()).collect();
            messages.push(
                ValidationMessage::info(
                    Category::Drift,
                    "drift_skipped",
                    format!("{} features could not be tested for drift", names.len()),
                )
                .with_detail("features", names),
            );
        }
        messages
    }
}

/// Whether a test outcome counts as drift for a feature kind.
pub fn is_drifted(
    kind: DriftKind,
    p_value: f64,
    effect_size: f64,
    thresholds: &DriftThresholds,
) -> bool {
    let effect_bar = if kind.is_numeric() {
        thresholds.numeric_effect
    } else {
        thresholds.categorical_effect
    };
    p_value < thresholds.p_value && effect_size > effect_bar
}

/// Severity of the aggregate drifted fraction.
pub fn aggregate_severity(drifted_fraction: f64, thresholds: &DriftThresholds) -> Severity {
    if drifted_fraction > thresholds.error_fraction {
        Severity::Error
    } else if drifted_fraction >= thresholds.warning_fraction {
        Severity::Warning
    } else {
        Severity::Info
    }
}

enum Outcome {
    Tested(FeatureDrift, Option<PrevalenceShift>),
    Skipped(SkippedFeature),
}

/// Test every feature present in both cohorts.
///
/// Features are tested in parallel; the report keeps the input order.
pub fn detect_drift(
    reference: &DataFrame,
    current: &DataFrame,
    features: &[DriftFeature],
    thresholds: &DriftThresholds,
) -> Result<DriftReport> {
    let outcomes = features
        .par_iter()
        .map(|feature| test_feature(reference, current, feature, thresholds))
        .collect::<Result<Vec<_>>>()?;

    let mut report = DriftReport {
        features: Vec::new(),
        skipped: Vec::new(),
        prevalence_shifts: Vec::new(),
        drifted_fraction: 0.0,
        severity: Severity::Info,
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Tested(drift, shift) => {
                report.features.push(drift);
                report.prevalence_shifts.extend(shift);
            }
            Outcome::Skipped(skipped) => report.skipped.push(skipped),
        }
    }

    let drifted = report.drifted().count();
    if !report.features.is_empty() {
        report.drifted_fraction = drifted as f64 / report.features.len() as f64;
    }
    report.severity = aggregate_severity(report.drifted_fraction, thresholds);
    info!(
        tested = report.features.len(),
        drifted,
        skipped = report.skipped.len(),
        high_risk = report.high_risk_hits().count(),
        "drift detection finished"
    );
    Ok(report)
}

fn test_feature(
    reference: &DataFrame,
    current: &DataFrame,
    feature: &DriftFeature,
    thresholds: &DriftThresholds,
) -> Result<Outcome> {
    let name = feature.name.as_str();
    if reference.column(name).is_err() || current.column(name).is_err() {
        return Ok(Outcome::Skipped(SkippedFeature {
            feature: feature.name.clone(),
            reason: "missing_column".to_string(),
        }));
    }

    let measured = match feature.kind {
        DriftKind::Numeric => measure_numeric(reference, current, name)?,
        DriftKind::Categorical | DriftKind::Binary => {
            measure_categorical(reference, current, feature, thresholds)?
        }
    };
    let Some(Measured {
        outcome,
        test_used,
        effect_size,
        reference_summary,
        new_summary,
        shift,
    }) = measured
    else {
        return Ok(Outcome::Skipped(SkippedFeature {
            feature: feature.name.clone(),
            reason: "insufficient_values".to_string(),
        }));
    };

    let TestOutcome { statistic, p_value } = outcome;
    let drifted = is_drifted(feature.kind, p_value, effect_size, thresholds);
    let high_risk = thresholds.is_high_risk(name)
        && p_value < thresholds.p_value
        && effect_size > thresholds.high_risk_effect;
    debug!(
        feature = name,
        statistic,
        p_value,
        effect_size,
        drifted,
        "feature drift tested"
    );

    Ok(Outcome::Tested(
        FeatureDrift {
            feature: feature.name.clone(),
            kind: feature.kind,
            test_used,
            statistic,
            p_value,
            effect_size,
            reference_summary,
            new_summary,
            drifted,
            high_risk,
        },
        shift,
    ))
}

struct Measured {
    outcome: TestOutcome,
    test_used: DriftTest,
    effect_size: f64,
    reference_summary: DistributionSummary,
    new_summary: DistributionSummary,
    shift: Option<PrevalenceShift>,
}

fn measure_numeric(
    reference: &DataFrame,
    current: &DataFrame,
    name: &str,
) -> Result<Option<Measured>> {
    let a = present_numbers(reference, name)?;
    let b = present_numbers(current, name)?;
    if a.len() < 2 || b.len() < 2 {
        return Ok(None);
    }
    Ok(Some(Measured {
        outcome: ks_two_sample(&a, &b),
        test_used: DriftTest::KolmogorovSmirnov,
        effect_size: cohens_d(&a, &b),
        reference_summary: numeric_summary(&a),
        new_summary: numeric_summary(&b),
        shift: None,
    }))
}

fn measure_categorical(
    reference: &DataFrame,
    current: &DataFrame,
    feature: &DriftFeature,
    thresholds: &DriftThresholds,
) -> Result<Option<Measured>> {
    let name = feature.name.as_str();
    let (a, b, shift) = if feature.kind == DriftKind::Binary {
        let a = present_numbers(reference, name)?;
        let b = present_numbers(current, name)?;
        let shift = check_prevalence(name, &a, &b, thresholds);
        (numeric_tokens(&a), numeric_tokens(&b), shift)
    } else {
        (
            present_strings(reference, name)?,
            present_strings(current, name)?,
            None,
        )
    };
    if a.len() < 2 || b.len() < 2 {
        return Ok(None);
    }
    let (counts_a, counts_b) = (category_counts(&a), category_counts(&b));
    let outcome = chi_square_two_sample(&counts_a, &counts_b);
    Ok(Some(Measured {
        outcome,
        test_used: DriftTest::ChiSquare,
        effect_size: cramers_v(outcome.statistic, a.len() + b.len()),
        reference_summary: categorical_summary(&counts_a, a.len()),
        new_summary: categorical_summary(&counts_b, b.len()),
        shift,
    }))
}

fn present_numbers(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(column_numbers(df, name)?.into_iter().flatten().collect())
}

fn present_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    Ok(column_strings(df, name)?.into_iter().flatten().collect())
}

fn numeric_tokens(values: &[f64]) -> Vec<String> {
    values.iter().map(|v| format_numeric(*v)).collect()
}

fn category_counts(values: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value.clone()).or_default() += 1;
    }
    counts
}

fn numeric_summary(values: &[f64]) -> DistributionSummary {
    let (mean, variance) = mean_variance(values);
    DistributionSummary::Numeric {
        count: values.len(),
        mean,
        std: variance.sqrt(),
        median: median(values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

fn categorical_summary(counts: &BTreeMap<String, usize>, total: usize) -> DistributionSummary {
    let proportions = counts
        .iter()
        .map(|(category, count)| (category.clone(), *count as f64 / total.max(1) as f64))
        .collect();
    DistributionSummary::Categorical {
        count: total,
        proportions,
    }
}
