//! Permanent deletion of duplicate files.
//!
//! # Overview
//!
//! This module deletes the duplicate records of a classification:
//! - Single-file permanent deletion
//! - Verification that the file still matches its scan snapshot
//! - Best-effort batch deletion with per-file outcomes
//!
//! # Safety
//!
//! Only duplicate records are ever passed here; kept records never are.
//! Every file is attempted independently; one failure never stops the rest.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::delete::permanent_delete;
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/duplicate.txt");
//! match permanent_delete(&path) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{Action, ActionReporter};
use crate::scanner::FileRecord;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size or modification time changed since the scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Results of a batch deletion operation.
#[derive(Debug, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions.
    pub failures: Vec<DeleteError>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Refuse to delete a file whose size or mtime differs from its scan snapshot.
    pub verify_unchanged: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            verify_unchanged: true,
        }
    }
}

impl DeleteConfig {
    /// Enable/disable snapshot verification.
    #[must_use]
    pub fn with_verify_unchanged(mut self, verify: bool) -> Self {
        self.verify_unchanged = verify;
        self
    }
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
    let size = metadata.len();

    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;

    log::debug!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size))
}

/// Delete a scanned file after checking it still matches the scan.
///
/// # Errors
///
/// - `Modified` if size or modification time changed since the scan
/// - Other errors from [`permanent_delete`]
pub fn delete_verified(
    record: &FileRecord,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeleteError> {
    if config.verify_unchanged {
        let path = record.path.as_path();
        let current = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
        let mtime_changed = current.modified().is_ok_and(|m| m != record.modified);
        if current.len() != record.size || mtime_changed {
            log::warn!("File modified since scan: {}", path.display());
            return Err(DeleteError::Modified(record.path.clone()));
        }
    }

    permanent_delete(&record.path)
}

/// Delete every record in order, continuing past failures.
pub fn delete_batch<'a>(
    records: impl IntoIterator<Item = &'a FileRecord>,
    config: &DeleteConfig,
    reporter: &mut dyn ActionReporter,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for record in records {
        match delete_verified(record, config) {
            Ok(deleted) => {
                reporter.on_success(Action::Delete, &deleted.path);
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(e) => {
                reporter.on_failure(Action::Delete, &record.path, &e);
                result.failures.push(e);
            }
        }
    }

    log::info!("{}", result.summary());
    result
}
