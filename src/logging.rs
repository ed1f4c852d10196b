//! Logging infrastructure for dupsweep.
//!
//! Two separate channels exist:
//!
//! - **Diagnostics** go through the `log` facade with an `env_logger`
//!   backend, configured once by [`init_logging`].
//! - **The event log** is an append-only file of deletions, folder
//!   removals and failures. It is an explicit [`EventLog`] handle owned by
//!   the retention workflow: opened when the workflow starts and closed when
//!   it ends. There is no process-wide event logger.
//!
//! Diagnostic levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: warn level
//!
//! # Example
//!
//! ```rust,no_run
//! use dupsweep::logging::{init_logging, EventLog};
//!
//! init_logging(0, false);
//!
//! let mut events = EventLog::open("duplicate_files_log.txt").unwrap();
//! events.info("Deleted: /tmp/copy.txt");
//! events.close().unwrap();
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;

/// Timestamp layout of event log lines.
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Initialize diagnostic logging based on CLI verbosity flags.
///
/// Call once at the start of the application, before any logging calls.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=warn, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = std::env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);
        if verbose >= 1 {
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        }
    });

    // A second initialization (e.g. from tests) is harmless
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Severity of an event log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    /// Successful deletion or folder removal
    Info,
    /// Failed backup, deletion or folder removal
    Error,
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("INFO"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}

/// Append-only event log handle.
///
/// Each event is one line, `<timestamp> - <LEVEL> - <message>`, and is
/// mirrored to the diagnostic `log` facade. Write failures are reported as
/// diagnostics and never interrupt the caller's batch.
pub struct EventLog {
    path: Option<PathBuf>,
    writer: Box<dyn Write>,
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog").field("path", &self.path).finish()
    }
}

impl EventLog {
    /// Open (creating if absent) a log file for appending.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file: File = OpenOptions::new().create(true).append(true).open(path)?;
        log::debug!("Event log opened at {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            writer: Box::new(BufWriter::new(file)),
        })
    }

    /// Log into an arbitrary writer.
    #[must_use]
    pub fn from_writer(writer: impl Write + 'static) -> Self {
        Self {
            path: None,
            writer: Box::new(writer),
        }
    }

    /// A log that discards every event.
    #[must_use]
    pub fn sink() -> Self {
        Self::from_writer(io::sink())
    }

    /// Path of the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a successful operation.
    pub fn info(&mut self, message: impl fmt::Display) {
        self.record(EventLevel::Info, message);
    }

    /// Record a failed operation.
    pub fn error(&mut self, message: impl fmt::Display) {
        self.record(EventLevel::Error, message);
    }

    /// Append one event line.
    pub fn record(&mut self, level: EventLevel, message: impl fmt::Display) {
        match level {
            EventLevel::Info => log::info!("{}", message),
            EventLevel::Error => log::error!("{}", message),
        }

        let line = format_event(&Local::now().format(EVENT_TIMESTAMP_FORMAT), level, &message);
        if let Err(e) = writeln!(self.writer, "{}", line) {
            log::warn!("Failed to write event log: {}", e);
        }
    }

    /// Flush pending lines and release the file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the final flush fails.
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Render one event line without the trailing newline.
fn format_event(
    timestamp: &impl fmt::Display,
    level: EventLevel,
    message: &impl fmt::Display,
) -> String {
    format!("{} - {} - {}", timestamp, level, message)
}
