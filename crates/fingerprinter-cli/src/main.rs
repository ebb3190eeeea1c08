mod commands;
mod logging;
mod progress;

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use commands::Cli;
use dotenv::dotenv;
use fingerprinter_core::{AppConfig, RunSummary, ScanEngine};
use progress::CliReporter;
use tracing::{debug, error};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse_from(commands::normalize_legacy_flags(env::args_os()));

    if args.files.is_empty() {
        // Logging is not set up yet, so report straight to stderr.
        if let Err(err) = Cli::command().print_long_help() {
            eprintln!("Unable to print usage: {}", err);
        }
        return ExitCode::from(2);
    }

    let _guard = logging::init_logger();

    match run(args) {
        Ok(summary) => {
            debug!(
                "Run finished: {} saved, {} skipped, {} tracks in store",
                summary.persisted,
                summary.skipped(),
                summary.total_tracks,
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> anyhow::Result<RunSummary> {
    let config = fingerprinter_core::config::load_configuration()
        .context("Error loading configuration")?;
    let config = apply_overrides(config, &args);
    debug!("Configuration: {:?}", config);

    let db_path = config.db_path.clone();
    let engine = ScanEngine::new(config, args.files);
    let reporter = CliReporter::new();
    engine
        .run(&reporter)
        .with_context(|| format!("Fingerprinting into {} failed", db_path))
}

/// Flags given on the command line win over file and environment settings.
fn apply_overrides(mut config: AppConfig, args: &Cli) -> AppConfig {
    if let Some(length) = args.length {
        config.length = length;
    }
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    config
}
