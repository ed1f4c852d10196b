//! dupsweep - duplicate file sweeper
//!
//! Scans a directory tree, groups files with identical content by BLAKE3
//! digest, keeps the most recently modified copy of each group, backs up
//! and (after confirmation) deletes the rest, then removes folders left
//! empty.
//!
//! The pipeline is strictly one-directional:
//! [`scanner`] → [`duplicates`] → [`workflow`] (using [`actions`]).

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod workflow;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::logging::EventLog;
use crate::progress::Progress;
use crate::workflow::{RetentionWorkflow, StdinPrompt, WorkflowOptions};

/// Run the whole application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error wrapping [`config::ConfigError`] when the configuration
/// or scan root is unusable, or any other fatal I/O failure.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load(&cli).context("invalid configuration")?;
    if cli.save_config {
        let path = config
            .save_for(&cli)
            .context("cannot save configuration")?;
        println!("Configuration written to {}", path.display());
        return Ok(ExitCode::Success);
    }

    let config = config.validate().context("invalid configuration")?;
    log::debug!("Configuration: {:?}", config);

    let progress = Arc::new(Progress::new(cli.quiet));
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_walker_config(config.walker_config())
            .with_progress_callback(progress),
    );

    let (classification, summary) = finder
        .find_duplicates(&config.scan_root)
        .context("scan failed")?;
    log::info!(
        "Scanned {} files ({}) in {:.2?}, {} skipped",
        summary.total_files,
        summary.total_size_display(),
        summary.scan_duration,
        summary.scan_errors.len()
    );

    let events = EventLog::open(&config.log_file)
        .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;

    let options = WorkflowOptions::new(&config.scan_root, &config.backup_dir)
        .with_color(!cli.no_color);
    let mut prompt = StdinPrompt;
    let mut stdout = std::io::stdout();

    let report = RetentionWorkflow::new(options, events, &mut prompt, &mut stdout)
        .with_scan_errors(&summary.scan_errors)
        .run(&classification);
    stdout.flush().context("failed to flush output")?;

    log::debug!("Workflow finished in state {}", report.final_state());
    Ok(ExitCode::Success)
}
