//! Training and scoring runs.
//!
//! Both start from a full cycle validation. Features are produced only when
//! the validation allows proceeding; otherwise the outcome carries the
//! blocking messages and no output.

use tracing::{info, info_span, warn};

use triage_features::{
    FeatureError, FeaturePipeline, FeatureTable, PipelineStore, RubricScores, StoredPipeline,
};
use triage_ingest::RawTable;
use triage_model::{Category, DataMode, ValidationMessage};
use triage_standards::TriageConfig;

use crate::error::Result;
use crate::reference::ReferenceBaseline;
use crate::validation::{CycleValidation, validate_cycle};

/// Inputs shared by training and scoring.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions<'a> {
    pub version: &'a str,
    pub rubric: Option<&'a RubricScores>,
    pub reference: Option<&'a ReferenceBaseline>,
}

impl<'a> RunOptions<'a> {
    pub fn new(version: &'a str) -> Self {
        Self {
            version,
            rubric: None,
            reference: None,
        }
    }

    pub fn with_rubric(mut self, rubric: Option<&'a RubricScores>) -> Self {
        self.rubric = rubric;
        self
    }

    pub fn with_reference(mut self, reference: Option<&'a ReferenceBaseline>) -> Self {
        self.reference = reference;
        self
    }
}

/// The fitted state used and the features it produced.
#[derive(Debug, Clone)]
pub struct FeatureOutput {
    pub pipeline: StoredPipeline,
    pub table: FeatureTable,
}

/// Result of a training or scoring run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub validation: CycleValidation,
    /// `None` when validation blocked the run.
    pub output: Option<FeatureOutput>,
}

impl RunOutcome {
    pub fn can_proceed(&self) -> bool {
        self.validation.can_proceed()
    }

    fn blocked(validation: CycleValidation, operation: &str) -> Self {
        warn!(
            operation,
            errors = validation.result.error_count(),
            "run blocked by validation errors"
        );
        Self {
            validation,
            output: None,
        }
    }
}

/// Validates a labelled cycle, fits the pipeline and stores it as `version`.
///
/// An existing version is refused before any work is done.
pub fn train(
    tables: &[RawTable],
    options: RunOptions<'_>,
    store: &PipelineStore,
    config: &TriageConfig,
) -> Result<RunOutcome> {
    let span = info_span!("train", version = options.version);
    let _guard = span.enter();

    if store.contains(options.version) {
        return Err(FeatureError::VersionExists {
            version: options.version.to_string(),
            path: store.path_for(options.version),
        }
        .into());
    }

    let mut validation = validate_cycle(tables, options.reference, config)?;
    require_mode(&mut validation, "train", |mode| mode == DataMode::Training);
    if !validation.can_proceed() {
        return Ok(RunOutcome::blocked(validation, "train"));
    }
    let dataset = validation
        .dataset
        .as_ref()
        .ok_or(FeatureError::MissingPrimary)?;

    let (fitted, table) = FeaturePipeline::new().fit_transform(dataset, options.rubric)?;
    let pipeline = store.save(options.version, &fitted)?;
    info!(
        rows = table.height(),
        features = table.width(),
        signature = %pipeline.pipeline.fitted_on_signature,
        "training run finished"
    );
    Ok(RunOutcome {
        validation,
        output: Some(FeatureOutput { pipeline, table }),
    })
}

/// Validates a cycle and transforms it with the stored `version`.
///
/// The fitted state must already exist; scoring never fits.
pub fn score(
    tables: &[RawTable],
    options: RunOptions<'_>,
    store: &PipelineStore,
    config: &TriageConfig,
) -> Result<RunOutcome> {
    let span = info_span!("score", version = options.version);
    let _guard = span.enter();

    let pipeline = store.load(options.version)?;
    let mut validation = validate_cycle(tables, options.reference, config)?;
    require_mode(&mut validation, "score", |mode| mode != DataMode::Mixed);
    if !validation.can_proceed() {
        return Ok(RunOutcome::blocked(validation, "score"));
    }
    let dataset = validation
        .dataset
        .as_ref()
        .ok_or(FeatureError::MissingPrimary)?;

    let table = pipeline.pipeline.transform(dataset, options.rubric);
    info!(
        rows = table.height(),
        features = table.width(),
        "scoring run finished"
    );
    Ok(RunOutcome {
        validation,
        output: Some(FeatureOutput { pipeline, table }),
    })
}

/// Adds an ERROR when the detected data mode does not suit the operation.
///
/// An undetected mode is left to the structural errors that caused it.
fn require_mode(
    validation: &mut CycleValidation,
    operation: &str,
    allowed: impl Fn(DataMode) -> bool,
) {
    let Some(mode) = validation.result.data_mode() else {
        return;
    };
    if allowed(mode) || mode == DataMode::Mixed {
        return;
    }
    validation.result.push(
        ValidationMessage::error(
            Category::DataQuality,
            "data_mode_mismatch",
            format!("Cannot {operation} on a cycle in {} mode", mode.as_str()),
        )
        .with_detail("operation", operation)
        .with_detail("data_mode", mode.as_str()),
    );
}
