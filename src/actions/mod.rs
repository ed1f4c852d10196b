//! File actions module.
//!
//! This module provides the side-effecting steps of the retention workflow:
//! - Backup copies of duplicates ([`backup`])
//! - Deletion of duplicates ([`delete`])
//! - Bottom-up removal of empty directories ([`prune`])
//!
//! Every batch is best-effort: each item is attempted independently, a
//! failure is reported through an [`ActionReporter`] and collected in the
//! batch result, and the loop moves on to the next item.
//!
//! ```no_run
//! use dupsweep::actions::{delete_batch, DeleteConfig, SilentReporter};
//! use dupsweep::scanner::FileRecord;
//!
//! let records: Vec<FileRecord> = Vec::new();
//! let result = delete_batch(records.iter(), &DeleteConfig::default(), &mut SilentReporter);
//! println!("{}", result.summary());
//! ```

pub mod backup;
pub mod delete;
pub mod prune;

use std::fmt;
use std::path::Path;

// Re-export commonly used types
pub use backup::{backup_batch, backup_file, BackupError, BackupResult, BatchBackupResult};
pub use delete::{
    delete_batch, delete_verified, permanent_delete, BatchDeleteResult, DeleteConfig,
    DeleteError, DeleteResult,
};
pub use prune::{remove_empty_dirs, BatchPruneResult, PruneError};

/// Kind of per-item action being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stat or hash a file during the scan
    Scan,
    /// Copy into the backup directory
    Backup,
    /// Delete a duplicate file
    Delete,
    /// Remove an empty directory
    Prune,
}

impl Action {
    /// Message announcing a successful action.
    #[must_use]
    pub fn success_message(self, path: &Path) -> String {
        match self {
            Self::Scan => format!("Scanned: {}", path.display()),
            Self::Backup => format!("Backed up: {}", path.display()),
            Self::Delete => format!("Deleted: {}", path.display()),
            Self::Prune => format!("Removed empty folder: {}", path.display()),
        }
    }

    /// Message announcing a failed action.
    #[must_use]
    pub fn failure_message(self, path: &Path, error: &dyn fmt::Display) -> String {
        match self {
            Self::Scan => format!("Error reading {}: {}", path.display(), error),
            Self::Backup => format!("Error backing up {}: {}", path.display(), error),
            Self::Delete => format!("Error deleting {}: {}", path.display(), error),
            Self::Prune => format!("Error removing folder {}: {}", path.display(), error),
        }
    }
}

/// Receives per-item outcomes as a batch runs.
pub trait ActionReporter {
    /// Called after an item succeeded.
    fn on_success(&mut self, action: Action, path: &Path);

    /// Called after an item failed; the batch continues afterwards.
    fn on_failure(&mut self, action: Action, path: &Path, error: &dyn fmt::Display);
}

/// Reporter that only forwards outcomes to the diagnostic log.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ActionReporter for SilentReporter {
    fn on_success(&mut self, action: Action, path: &Path) {
        log::debug!("{}", action.success_message(path));
    }

    fn on_failure(&mut self, action: Action, path: &Path, error: &dyn fmt::Display) {
        log::debug!("{}", action.failure_message(path, error));
    }
}
