use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Serialize;
use tracing::{debug, info, info_span};

use triage_cli::logging::redact_value;
use triage_core::{
    CycleValidation, ReferenceBaseline, RunOptions, RunOutcome, build_reference, load_cycle,
    score, train, validate_cycle,
};
use triage_features::{FeatureTable, PipelineStore, RubricScores};
use triage_ingest::RawTable;
use triage_model::{FileType, ValidationResult};
use triage_standards::TriageConfig;
use triage_validate::DriftReport;

use crate::cli::{Cli, RunArgs, ValidateArgs};
use crate::summary::apply_table_style;

/// The JSON document written by `--json`.
#[derive(Serialize)]
struct Report<'a> {
    result: &'a ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    drift: Option<&'a DriftReport>,
}

/// Built-in registry, or the `--config` file merged over it.
pub fn load_config(cli: &Cli) -> Result<TriageConfig> {
    let mut config = match &cli.config {
        Some(path) => TriageConfig::load(path)
            .with_context(|| format!("load configuration {}", path.display()))?,
        None => TriageConfig::default_config().context("load built-in configuration")?,
    };
    if let Some(store) = &cli.store {
        config.store.directory = store.clone();
    }
    Ok(config)
}

pub fn run_file_types(config: &TriageConfig) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        "File type",
        "Label",
        "Required",
        "Rows (expected)",
        "Critical columns",
    ]);
    apply_table_style(&mut table);
    for file_type in FileType::ALL {
        let spec = config.file_type_spec(file_type);
        let rows = spec.map_or_else(
            || "-".to_string(),
            |spec| format!("{}-{}", spec.rows.expected_min, spec.rows.expected_max),
        );
        let critical = spec
            .map(|spec| spec.critical_columns.join(", "))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(file_type.as_str()),
            Cell::new(file_type.label()),
            Cell::new(if file_type.is_required() { "yes" } else { "no" }),
            Cell::new(rows),
            Cell::new(critical),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_validate(args: &ValidateArgs, config: &TriageConfig) -> Result<CycleValidation> {
    let span = info_span!("validate", cycle = %args.cycle.display());
    let _guard = span.enter();

    let reference = load_reference(args.reference.as_deref(), config)?;
    let cycle = load_cycle(&args.cycle)
        .with_context(|| format!("load cycle {}", args.cycle.display()))?;
    let validation = validate_cycle(&cycle.tables, reference.as_ref(), config)
        .context("validate cycle")?;
    if let Some(path) = &args.json {
        write_report(path, &validation)?;
    }
    Ok(validation)
}

pub fn run_train(args: &RunArgs, config: &TriageConfig) -> Result<RunOutcome> {
    run_with(args, config, "train", train)
}

pub fn run_score(args: &RunArgs, config: &TriageConfig) -> Result<RunOutcome> {
    run_with(args, config, "score", score)
}

type Runner = fn(
    &[RawTable],
    RunOptions<'_>,
    &PipelineStore,
    &TriageConfig,
) -> triage_core::Result<RunOutcome>;

fn run_with(
    args: &RunArgs,
    config: &TriageConfig,
    operation: &'static str,
    runner: Runner,
) -> Result<RunOutcome> {
    let span = info_span!("run", operation, version = %args.version);
    let _guard = span.enter();

    let rubric = match &args.rubric {
        Some(path) => Some(
            RubricScores::from_json_file(path)
                .with_context(|| format!("load rubric scores {}", path.display()))?,
        ),
        None => None,
    };
    let reference = load_reference(args.reference.as_deref(), config)?;
    let cycle = load_cycle(&args.cycle)
        .with_context(|| format!("load cycle {}", args.cycle.display()))?;
    let store = PipelineStore::from_config(&config.store);

    let options = RunOptions::new(&args.version)
        .with_rubric(rubric.as_ref())
        .with_reference(reference.as_ref());
    let outcome = runner(&cycle.tables, options, &store, config)
        .with_context(|| format!("{operation} with pipeline version {}", args.version))?;

    if let Some(path) = &args.json {
        write_report(path, &outcome.validation)?;
    }
    if let (Some(path), Some(output)) = (&args.output, &outcome.output) {
        write_features(path, &output.table)?;
    }
    Ok(outcome)
}

fn load_reference(dir: Option<&Path>, config: &TriageConfig) -> Result<Option<ReferenceBaseline>> {
    let Some(dir) = dir else {
        return Ok(None);
    };
    let cycle =
        load_cycle(dir).with_context(|| format!("load reference cycle {}", dir.display()))?;
    let reference = build_reference(&cycle.tables, config).context("build reference baseline")?;
    Ok(Some(reference))
}

fn write_report(path: &Path, validation: &CycleValidation) -> Result<()> {
    let report = Report {
        result: &validation.result,
        drift: validation.drift.as_ref(),
    };
    let json = serde_json::to_string_pretty(&report).context("serialize validation report")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "validation report written");
    Ok(())
}

fn write_features(path: &Path, table: &FeatureTable) -> Result<()> {
    table
        .write_csv(path)
        .with_context(|| format!("write feature table {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "feature table written"
    );
    if let Some(first) = table.ids().first() {
        debug!(first_applicant = redact_value(first), "feature table order");
    }
    Ok(())
}
