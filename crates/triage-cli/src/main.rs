//! Admissions triage CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use triage_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{load_config, run_file_types, run_score, run_train, run_validate};
use crate::summary::{print_output, print_validation};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Runs the selected command. Returns 1 when the cycle may not proceed.
fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = load_config(cli)?;
    let code = match &cli.command {
        Command::Validate(args) => {
            let validation = run_validate(args, &config)?;
            print_validation(&validation);
            exit_code(validation.can_proceed())
        }
        Command::Train(args) => {
            let outcome = run_train(args, &config)?;
            print_validation(&outcome.validation);
            if let Some(output) = &outcome.output {
                print_output(output);
            }
            exit_code(outcome.output.is_some())
        }
        Command::Score(args) => {
            let outcome = run_score(args, &config)?;
            print_validation(&outcome.validation);
            if let Some(output) = &outcome.output {
                print_output(output);
            }
            exit_code(outcome.output.is_some())
        }
        Command::FileTypes => {
            run_file_types(&config)?;
            0
        }
    };
    Ok(code)
}

fn exit_code(proceed: bool) -> i32 {
    if proceed { 0 } else { 1 }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
