//! Retention workflow: backup, present, confirm, delete, prune.
//!
//! The workflow consumes a finished [`Classification`] and walks a fixed
//! state machine:
//!
//! ```text
//! Scanned -> Classified -> Pruned                                  (no duplicates)
//! Scanned -> Classified -> BackedUp -> Presented -> Confirmed -> Deleted -> Pruned
//! Scanned -> Classified -> BackedUp -> Presented -> Declined -> Pruned
//! ```
//!
//! Every path ends with the empty-folder prune pass. Per-file failures,
//! including entries the scan had to skip, are printed, written to the
//! event log and collected in the [`WorkflowReport`]; none of them stops
//! the run.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::actions::{
    backup_batch, delete_batch, remove_empty_dirs, Action, ActionReporter, BatchBackupResult,
    BatchDeleteResult, BatchPruneResult, DeleteConfig,
};
use crate::duplicates::Classification;
use crate::logging::EventLog;
use crate::output::TableOutput;
use crate::scanner::ScanError;

/// Question asked before any file is deleted.
pub const CONFIRMATION_QUESTION: &str = "\nDo you want to delete all the above files? (yes/no): ";

/// Source of the operator's answer to the confirmation question.
pub trait Prompt {
    /// Show `question` and return the raw answer.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the answer cannot be read.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Prompt on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer)
    }
}

/// Whether an answer authorizes deletion: `yes`, ignoring case and
/// surrounding whitespace. Anything else declines.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// Position in the retention state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Scanned,
    Classified,
    BackedUp,
    Presented,
    Confirmed,
    Declined,
    Deleted,
    Pruned,
}

impl WorkflowState {
    /// Whether `next` may directly follow this state.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Scanned, Classified)
                | (Classified, Pruned)
                | (Classified, BackedUp)
                | (BackedUp, Presented)
                | (Presented, Confirmed)
                | (Presented, Declined)
                | (Confirmed, Deleted)
                | (Deleted, Pruned)
                | (Declined, Pruned)
        )
    }

    /// Whether the run is over.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Pruned
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scanned => "scanned",
            Self::Classified => "classified",
            Self::BackedUp => "backed up",
            Self::Presented => "presented",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
            Self::Deleted => "deleted",
            Self::Pruned => "pruned",
        };
        f.write_str(name)
    }
}

/// Paths and switches for one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Directory whose empty folders are pruned at the end.
    pub scan_root: PathBuf,
    /// Destination of backup copies.
    pub backup_dir: PathBuf,
    /// Bold table headers.
    pub color: bool,
    pub delete_config: DeleteConfig,
}

impl WorkflowOptions {
    #[must_use]
    pub fn new(scan_root: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            scan_root: scan_root.into(),
            backup_dir: backup_dir.into(),
            color: true,
            delete_config: DeleteConfig::default(),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Everything a finished run did.
#[derive(Debug)]
pub struct WorkflowReport {
    /// States visited, in order. The last one is always [`WorkflowState::Pruned`].
    pub states: Vec<WorkflowState>,
    /// Entries skipped by the scan.
    pub scan_failures: usize,
    /// Absent when no duplicates were found.
    pub backup: Option<BatchBackupResult>,
    /// Absent unless deletion was confirmed.
    pub deletion: Option<BatchDeleteResult>,
    pub prune: BatchPruneResult,
}

impl WorkflowReport {
    /// Final state of the run.
    #[must_use]
    pub fn final_state(&self) -> WorkflowState {
        self.states
            .last()
            .copied()
            .unwrap_or(WorkflowState::Scanned)
    }

    /// Whether the operator confirmed deletion.
    #[must_use]
    pub fn confirmed(&self) -> bool {
        self.states.contains(&WorkflowState::Confirmed)
    }

    /// Failures across all phases.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.scan_failures
            + self.backup.as_ref().map_or(0, BatchBackupResult::failure_count)
            + self.deletion.as_ref().map_or(0, BatchDeleteResult::failure_count)
            + self.prune.failure_count()
    }

    /// One-line account of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let backed_up = self.backup.as_ref().map_or(0, BatchBackupResult::success_count);
        let deleted = self.deletion.as_ref().map_or(0, BatchDeleteResult::success_count);
        let freed = self.deletion.as_ref().map_or(0, |d| d.bytes_freed);
        format!(
            "Summary: {} backed up, {} deleted ({} freed), {} failed, {} empty folder(s) removed",
            backed_up,
            deleted,
            bytesize::ByteSize::b(freed),
            self.failure_count(),
            self.prune.removed_count()
        )
    }
}

/// Prints each outcome and records it in the event log.
///
/// Successful backups are only printed; deletions, folder removals and every
/// failure (scan failures included) also become event log lines.
struct ConsoleReporter<'a> {
    out: &'a mut dyn Write,
    events: &'a mut EventLog,
}

impl ActionReporter for ConsoleReporter<'_> {
    fn on_success(&mut self, action: Action, path: &Path) {
        let message = action.success_message(path);
        say(self.out, &message);
        if !matches!(action, Action::Scan | Action::Backup) {
            self.events.info(message);
        }
    }

    fn on_failure(&mut self, action: Action, path: &Path, error: &dyn fmt::Display) {
        let message = action.failure_message(path, error);
        say(self.out, &message);
        self.events.error(message);
    }
}

fn say(out: &mut dyn Write, message: &str) {
    if let Err(e) = writeln!(out, "{}", message) {
        log::warn!("Failed to write to console: {}", e);
    }
}

/// One run of the retention workflow.
pub struct RetentionWorkflow<'a> {
    options: WorkflowOptions,
    events: EventLog,
    prompt: &'a mut dyn Prompt,
    out: &'a mut dyn Write,
    scan_errors: &'a [ScanError],
    states: Vec<WorkflowState>,
}

impl<'a> RetentionWorkflow<'a> {
    /// Create a workflow that owns `events` until the run ends.
    pub fn new(
        options: WorkflowOptions,
        events: EventLog,
        prompt: &'a mut dyn Prompt,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            options,
            events,
            prompt,
            out,
            scan_errors: &[],
            states: vec![WorkflowState::Scanned],
        }
    }

    /// Entries the scan skipped; each is reported before classification.
    #[must_use]
    pub fn with_scan_errors(mut self, errors: &'a [ScanError]) -> Self {
        self.scan_errors = errors;
        self
    }

    fn advance(&mut self, next: WorkflowState) {
        let current = self.state();
        debug_assert!(
            current.can_transition_to(next),
            "invalid transition {} -> {}",
            current,
            next
        );
        log::debug!("Workflow: {} -> {}", current, next);
        self.states.push(next);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.states
            .last()
            .copied()
            .unwrap_or(WorkflowState::Scanned)
    }

    /// Run every phase over `classification` and close the event log.
    pub fn run(mut self, classification: &Classification) -> WorkflowReport {
        let scan_failures = self.report_scan_errors();
        self.advance(WorkflowState::Classified);

        let mut backup = None;
        let mut deletion = None;

        if classification.has_duplicates() {
            say(
                self.out,
                &format!("Found {} duplicate files.", classification.duplicate_count()),
            );

            backup = Some(self.backup_phase(classification));
            self.advance(WorkflowState::BackedUp);

            self.present(classification);
            self.advance(WorkflowState::Presented);

            if self.confirm() {
                self.advance(WorkflowState::Confirmed);
                deletion = Some(self.delete_phase(classification));
                self.advance(WorkflowState::Deleted);
            } else {
                self.advance(WorkflowState::Declined);
                say(self.out, "Deletion aborted.");
            }
        } else {
            say(self.out, "No duplicate files found.");
        }

        let prune = self.prune_phase();
        self.advance(WorkflowState::Pruned);

        let report = WorkflowReport {
            states: self.states,
            scan_failures,
            backup,
            deletion,
            prune,
        };

        say(self.out, &report.summary());
        if let Err(e) = self.events.close() {
            log::warn!("Failed to flush event log: {}", e);
        }
        report
    }

    fn reporter(&mut self) -> ConsoleReporter<'_> {
        ConsoleReporter {
            out: &mut *self.out,
            events: &mut self.events,
        }
    }

    fn report_scan_errors(&mut self) -> usize {
        let errors = self.scan_errors;
        let mut reporter = self.reporter();
        for error in errors {
            reporter.on_failure(Action::Scan, error.path(), error);
        }
        errors.len()
    }

    fn backup_phase(&mut self, classification: &Classification) -> BatchBackupResult {
        let backup_dir = self.options.backup_dir.clone();
        backup_batch(classification.duplicates(), &backup_dir, &mut self.reporter())
    }

    fn present(&mut self, classification: &Classification) {
        if let Err(e) = writeln!(self.out) {
            log::warn!("Failed to write to console: {}", e);
        }
        let table = TableOutput::new(classification).with_color(self.options.color);
        if let Err(e) = table.write_to(self.out) {
            log::warn!("Failed to render tables: {}", e);
        }
    }

    fn confirm(&mut self) -> bool {
        match self.prompt.ask(CONFIRMATION_QUESTION) {
            Ok(answer) => is_affirmative(&answer),
            Err(e) => {
                log::warn!("Could not read confirmation, treating as no: {}", e);
                false
            }
        }
    }

    fn delete_phase(&mut self, classification: &Classification) -> BatchDeleteResult {
        let config = self.options.delete_config.clone();
        delete_batch(classification.duplicates(), &config, &mut self.reporter())
    }

    fn prune_phase(&mut self) -> BatchPruneResult {
        let root = self.options.scan_root.clone();
        remove_empty_dirs(&root, &mut self.reporter())
    }
}
