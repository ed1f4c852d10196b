//! Backup copies of duplicate files.
//!
//! Each duplicate is copied into a flat backup directory under its own file
//! name. When a name is already taken the copy gets a numeric suffix
//! (`report (1).txt`, `report (2).txt`, ...) so an earlier backup from the
//! same run is never overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{Action, ActionReporter};
use crate::scanner::FileRecord;

/// Upper bound on numeric suffixes tried for one file name.
const MAX_SUFFIX: u32 = 10_000;

/// Error type for backup operations.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The backup directory could not be created.
    #[error("cannot create backup directory {dir}: {source}")]
    CreateDir {
        path: PathBuf,
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source path has no file name component.
    #[error("no file name: {0}")]
    NoFileName(PathBuf),

    /// Every candidate name in the backup directory is taken.
    #[error("no free backup name for {0}")]
    NameExhausted(PathBuf),

    /// Copying the file failed.
    #[error("{source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BackupError {
    /// Get the source path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir { path, .. } | Self::Copy { path, .. } => path,
            Self::NoFileName(p) | Self::NameExhausted(p) => p,
        }
    }
}

/// A completed backup copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupResult {
    /// The duplicate that was copied.
    pub source: PathBuf,
    /// Where the copy was written.
    pub destination: PathBuf,
    /// Bytes copied.
    pub size: u64,
}

/// Results of a batch backup.
#[derive(Debug, Default)]
pub struct BatchBackupResult {
    pub successes: Vec<BackupResult>,
    pub failures: Vec<BackupError>,
}

impl BatchBackupResult {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total bytes copied.
    #[must_use]
    pub fn bytes_copied(&self) -> u64 {
        self.successes.iter().map(|r| r.size).sum()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let copied = bytesize::ByteSize::b(self.bytes_copied());
        if self.all_succeeded() {
            format!("Backed up {} file(s) ({})", self.success_count(), copied)
        } else {
            format!(
                "Backed up {} file(s) ({}), {} failed",
                self.success_count(),
                copied,
                self.failure_count()
            )
        }
    }
}

/// Whether nothing, not even a dangling symlink, occupies `path`.
fn is_vacant(path: &Path) -> bool {
    fs::symlink_metadata(path).is_err()
}

/// Pick a destination in `backup_dir` that does not exist yet.
fn free_destination(source: &Path, backup_dir: &Path) -> Result<PathBuf, BackupError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| BackupError::NoFileName(source.to_path_buf()))?;

    let candidate = backup_dir.join(file_name);
    if is_vacant(&candidate) {
        return Ok(candidate);
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    for n in 1..=MAX_SUFFIX {
        let numbered = match extension {
            Some(ref ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = backup_dir.join(numbered);
        if is_vacant(&candidate) {
            return Ok(candidate);
        }
    }

    Err(BackupError::NameExhausted(source.to_path_buf()))
}

/// Copy one duplicate into the backup directory, creating it if absent.
///
/// # Errors
///
/// Returns [`BackupError`] if the directory cannot be created, no free name
/// exists, or the copy fails.
pub fn backup_file(record: &FileRecord, backup_dir: &Path) -> Result<BackupResult, BackupError> {
    fs::create_dir_all(backup_dir).map_err(|source| BackupError::CreateDir {
        path: record.path.clone(),
        dir: backup_dir.to_path_buf(),
        source,
    })?;

    let destination = free_destination(&record.path, backup_dir)?;
    let size = fs::copy(&record.path, &destination).map_err(|source| BackupError::Copy {
        path: record.path.clone(),
        source,
    })?;

    log::debug!(
        "Backed up {} to {}",
        record.path.display(),
        destination.display()
    );
    Ok(BackupResult {
        source: record.path.clone(),
        destination,
        size,
    })
}

/// Back up every record in order, continuing past failures.
pub fn backup_batch<'a>(
    records: impl IntoIterator<Item = &'a FileRecord>,
    backup_dir: &Path,
    reporter: &mut dyn ActionReporter,
) -> BatchBackupResult {
    let mut result = BatchBackupResult::default();

    for record in records {
        match backup_file(record, backup_dir) {
            Ok(copied) => {
                reporter.on_success(Action::Backup, &copied.source);
                result.successes.push(copied);
            }
            Err(e) => {
                reporter.on_failure(Action::Backup, &record.path, &e);
                result.failures.push(e);
            }
        }
    }

    log::info!("{}", result.summary());
    result
}
