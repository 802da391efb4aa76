//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "triage",
    version,
    about = "Admissions triage - validate AMCAS exports and build model features",
    long_about = "Validate one admissions cycle of AMCAS exports and turn it into a\n\
                  model-ready feature table.\n\n\
                  Training cycles fit and persist a versioned feature pipeline;\n\
                  scoring cycles are transformed with a previously stored version."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Configuration file merged over the built-in registry.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Pipeline store directory (overrides the configured one).
    #[arg(long = "store", value_name = "DIR", global = true)]
    pub store: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow applicant-level values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a cycle directory without producing features.
    Validate(ValidateArgs),

    /// Validate a labelled cycle, fit the feature pipeline and store it.
    Train(RunArgs),

    /// Validate an unlabelled cycle and transform it with a stored pipeline.
    Score(RunArgs),

    /// List the known export file types.
    FileTypes,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Directory containing the cycle's CSV exports.
    #[arg(value_name = "CYCLE_DIR")]
    pub cycle: PathBuf,

    /// Previously accepted cycle to compare schemas and distributions against.
    #[arg(long = "reference", value_name = "DIR")]
    pub reference: Option<PathBuf>,

    /// Write the full validation result as JSON.
    #[arg(long = "json", value_name = "PATH")]
    pub json: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Directory containing the cycle's CSV exports.
    #[arg(value_name = "CYCLE_DIR")]
    pub cycle: PathBuf,

    /// Pipeline version to write (train) or read (score).
    #[arg(long = "version", value_name = "VERSION")]
    pub version: String,

    /// Rubric scores JSON, keyed by applicant.
    #[arg(long = "rubric", value_name = "PATH")]
    pub rubric: Option<PathBuf>,

    /// Previously accepted cycle to compare schemas and distributions against.
    #[arg(long = "reference", value_name = "DIR")]
    pub reference: Option<PathBuf>,

    /// Write the feature table as CSV.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write the full validation result as JSON.
    #[arg(long = "json", value_name = "PATH")]
    pub json: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
