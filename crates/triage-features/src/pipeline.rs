//! Fit/transform feature pipeline.
//!
//! `fit` learns imputation medians and category tables from one dataset and
//! returns an immutable [`FittedFeaturePipeline`]. `transform` applies that
//! state to any dataset and always yields the fitted columns in order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use triage_standards::features::{
    self, BINARY_FEATURES, CATEGORICAL_FEATURES, ENGINEERED_FEATURES, EXPERIENCE_FLAGS,
    FeatureFamily, NUMERIC_FEATURES, RUBRIC_SCORED_FLAG,
};

use crate::dataset::{ApplicantDataset, ApplicantRecord};
use crate::error::{FeatureError, Result};
use crate::rubric::RubricScores;
use crate::table::FeatureTable;

/// Value written for a rubric dimension that has not been scored.
pub const UNSCORED_RUBRIC: f64 = 0.0;

/// Code written for a category that was not seen during fitting.
pub const UNSEEN_CATEGORY: u32 = 0;

const ADVERSITY_FIELDS: [&str; 5] = [
    "first_generation_ind",
    "disadvantaged_ind",
    "ses_value",
    "pell_grant",
    "fee_assistance_program",
];

const GRIT_EXTRA_FIELDS: [&str; 3] = [
    "paid_employment_bf_18",
    "contribution_to_family",
    "childhood_med_underserved",
];

/// Which columns a pipeline produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturePipeline {
    columns: Vec<String>,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturePipeline {
    /// The full catalog: numeric, binary, engineered, experience flags,
    /// categorical, then rubric dimensions and `rubric_scored_flag`.
    pub fn new() -> Self {
        let columns = NUMERIC_FEATURES
            .iter()
            .chain(BINARY_FEATURES.iter())
            .chain(ENGINEERED_FEATURES.iter())
            .chain(EXPERIENCE_FLAGS.iter())
            .chain(CATEGORICAL_FEATURES.iter())
            .copied()
            .chain(features::rubric_dimensions())
            .chain(std::iter::once(RUBRIC_SCORED_FLAG))
            .map(str::to_string)
            .collect();
        Self { columns }
    }

    /// A pipeline over an explicit column list.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Learns imputation state from `dataset`.
    ///
    /// Rubric columns are kept only when rubric scores are supplied; the
    /// scores themselves never contribute statistics.
    pub fn fit(
        &self,
        dataset: &ApplicantDataset,
        rubric: Option<&RubricScores>,
    ) -> Result<FittedFeaturePipeline> {
        let mut feature_columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let name = column.trim().to_lowercase();
            if features::is_protected(&name) {
                return Err(FeatureError::ForbiddenFeature {
                    feature: column.clone(),
                });
            }
            let family =
                features::feature_family(&name).ok_or_else(|| FeatureError::UnknownFeature {
                    feature: column.clone(),
                })?;
            if family == FeatureFamily::Rubric && rubric.is_none() {
                continue;
            }
            if !feature_columns.contains(&name) {
                feature_columns.push(name);
            }
        }

        let mut imputation_values = BTreeMap::new();
        let mut encoding_tables = BTreeMap::new();
        for name in &feature_columns {
            match features::feature_family(name) {
                Some(FeatureFamily::Numeric) => {
                    let observed: Vec<f64> = dataset
                        .records()
                        .iter()
                        .filter_map(|record| record.numeric(name))
                        .collect();
                    imputation_values.insert(name.clone(), median(&observed).unwrap_or(0.0));
                }
                Some(FeatureFamily::Categorical) => {
                    let levels: BTreeSet<String> = dataset
                        .records()
                        .iter()
                        .filter_map(|record| record.category(name))
                        .map(normalize_category)
                        .filter(|level| !level.is_empty())
                        .collect();
                    let codes = levels
                        .into_iter()
                        .zip(UNSEEN_CATEGORY + 1..)
                        .collect::<BTreeMap<_, _>>();
                    encoding_tables.insert(name.clone(), codes);
                }
                _ => {}
            }
        }

        let fitted = FittedFeaturePipeline {
            feature_columns,
            imputation_values,
            encoding_tables,
            fitted_on_signature: dataset.signature(),
            training_rows: dataset.len(),
        };
        info!(
            features = fitted.feature_columns.len(),
            rows = fitted.training_rows,
            rubric = fitted.includes_rubric(),
            "feature pipeline fitted"
        );
        Ok(fitted)
    }

    /// Applies fitted state to a dataset. Pure and deterministic.
    pub fn transform(
        dataset: &ApplicantDataset,
        fitted: &FittedFeaturePipeline,
        rubric: Option<&RubricScores>,
    ) -> FeatureTable {
        transform_rows(dataset, fitted, rubric)
    }

    /// Fits on `dataset` and transforms it once.
    pub fn fit_transform(
        &self,
        dataset: &ApplicantDataset,
        rubric: Option<&RubricScores>,
    ) -> Result<(FittedFeaturePipeline, FeatureTable)> {
        let fitted = self.fit(dataset, rubric)?;
        let table = transform_rows(dataset, &fitted, rubric);
        Ok((fitted, table))
    }
}

fn transform_rows(
    dataset: &ApplicantDataset,
    fitted: &FittedFeaturePipeline,
    rubric: Option<&RubricScores>,
) -> FeatureTable {
    let rows: Vec<Vec<f64>> = dataset
        .records()
        .iter()
        .map(|record| {
            fitted
                .feature_columns
                .iter()
                .map(|column| fitted.value_for(record, column, rubric))
                .collect()
        })
        .collect();
    debug!(
        rows = rows.len(),
        columns = fitted.feature_columns.len(),
        "transformed applicant dataset"
    );
    FeatureTable::new(
        dataset.ids().map(str::to_string).collect(),
        fitted.feature_columns.clone(),
        rows,
    )
}

/// Learned state; persisted by the pipeline store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedFeaturePipeline {
    pub feature_columns: Vec<String>,
    /// Training median per numeric column.
    pub imputation_values: BTreeMap<String, f64>,
    /// Category level to code, starting at 1. Code 0 is reserved for unseen levels.
    pub encoding_tables: BTreeMap<String, BTreeMap<String, u32>>,
    /// Signature of the training dataset.
    pub fitted_on_signature: String,
    pub training_rows: usize,
}

impl FittedFeaturePipeline {
    pub fn transform(
        &self,
        dataset: &ApplicantDataset,
        rubric: Option<&RubricScores>,
    ) -> FeatureTable {
        FeaturePipeline::transform(dataset, self, rubric)
    }

    pub fn median(&self, column: &str) -> Option<f64> {
        self.imputation_values.get(column).copied()
    }

    pub fn code_for(&self, column: &str, level: &str) -> u32 {
        self.encoding_tables
            .get(column)
            .and_then(|codes| codes.get(&normalize_category(level)))
            .copied()
            .unwrap_or(UNSEEN_CATEGORY)
    }

    pub fn includes_rubric(&self) -> bool {
        self.feature_columns
            .iter()
            .any(|column| features::feature_family(column) == Some(FeatureFamily::Rubric))
    }

    fn value_for(
        &self,
        record: &ApplicantRecord,
        column: &str,
        rubric: Option<&RubricScores>,
    ) -> f64 {
        match features::feature_family(column) {
            Some(FeatureFamily::Numeric) => record
                .numeric(column)
                .or_else(|| self.median(column))
                .unwrap_or(0.0),
            Some(FeatureFamily::Binary | FeatureFamily::ExperienceFlag) => {
                indicator(record, column)
            }
            Some(FeatureFamily::Engineered) => engineered(record, column),
            Some(FeatureFamily::Categorical) => record
                .category(column)
                .map_or(f64::from(UNSEEN_CATEGORY), |level| {
                    f64::from(self.code_for(column, level))
                }),
            Some(FeatureFamily::Rubric) => {
                let scores = rubric.filter(|scores| !scores.is_empty());
                if column == RUBRIC_SCORED_FLAG {
                    let scored = scores.is_some_and(|scores| scores.is_scored(&record.amcas_id));
                    if scored { 1.0 } else { 0.0 }
                } else {
                    scores
                        .and_then(|scores| scores.score(&record.amcas_id, column))
                        .unwrap_or(UNSCORED_RUBRIC)
                }
            }
            None => 0.0,
        }
    }
}

fn indicator(record: &ApplicantRecord, column: &str) -> f64 {
    if record.binary(column).unwrap_or(false) {
        1.0
    } else {
        0.0
    }
}

fn hours(record: &ApplicantRecord, column: &str) -> f64 {
    record.numeric(column).unwrap_or(0.0)
}

fn ratio(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total } else { 0.0 }
}

/// Composites use observed values with missing treated as zero.
fn engineered(record: &ApplicantRecord, column: &str) -> f64 {
    let volunteer_med = hours(record, "exp_hour_volunteer_med");
    let volunteer_non_med = hours(record, "exp_hour_volunteer_non_med");
    let shadowing = hours(record, "exp_hour_shadowing");
    let employ_med = hours(record, "exp_hour_employ_med");
    let count = |fields: &[&str]| -> f64 {
        fields.iter().map(|field| indicator(record, field)).sum()
    };

    match column {
        "total_volunteer_hours" => volunteer_med + volunteer_non_med,
        "community_engaged_ratio" => {
            ratio(volunteer_non_med, volunteer_med + volunteer_non_med)
        }
        "clinical_total_hours" => shadowing + employ_med,
        "direct_care_ratio" => ratio(employ_med, shadowing + employ_med),
        "adversity_count" => count(&ADVERSITY_FIELDS),
        "grit_index" => count(&ADVERSITY_FIELDS) + count(&GRIT_EXTRA_FIELDS),
        "experience_diversity" => count(&EXPERIENCE_FLAGS),
        _ => 0.0,
    }
}

fn normalize_category(level: &str) -> String {
    level.trim().to_lowercase()
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}
