//! Command-line interface definitions for dupsweep.
//!
//! The CLI is a thin layer over [`crate::config::Config`]: every option here
//! overrides the same setting from the config file or environment.
//!
//! # Example
//!
//! ```bash
//! # Scan a tree, backing duplicates up to ./dupsweep-backup
//! dupsweep ~/Pictures
//!
//! # Scan a tree with a custom backup location and log file
//! dupsweep ~/Downloads --backup-dir ~/dup-backup --log-file ~/dupsweep.log
//!
//! # Skip hidden entries and build artifacts
//! dupsweep ~/src --skip-hidden -i target -i "*.o"
//!
//! # Remember the current settings in the platform config file
//! dupsweep ~/Pictures --backup-dir ~/dup-backup --save-config
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Find byte-identical duplicate files, back them up, and delete the redundant copies.
///
/// Within each group of identical files the most recently modified copy is
/// kept. Every other copy is backed up, listed for review and deleted only
/// after an explicit "yes". Folders left empty are removed at the end.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to deduplicate (overrides scan_root from the config file)
    #[arg(value_name = "SCAN_ROOT")]
    pub scan_root: Option<PathBuf>,

    /// Where copies of duplicates are written before deletion
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Append-only record of deletions, folder removals and errors
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Read settings from this TOML file instead of the platform config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the effective settings to the config file and exit without scanning
    ///
    /// The file is --config when given, else the platform config file.
    #[arg(long)]
    pub save_config: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any patterns from the config file.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress diagnostics and the progress spinner
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}
