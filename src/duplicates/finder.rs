//! Duplicate finder: walk, hash and classify in one sequential pass.
//!
//! # Overview
//!
//! The finder drives the pipeline leaf-first:
//! 1. **Walk** - the [`Walker`] yields file records in discovery order
//! 2. **Hash** - every record is hashed once with the [`Hasher`]
//! 3. **Classify** - the record and its digest go straight into the [`Classifier`]
//!
//! Records reach the classifier in exactly the order the walker discovered
//! them. Entries that cannot be stat'ed or read are recorded in
//! [`ScanSummary::scan_errors`] and skipped; only an inaccessible scan root
//! is fatal.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (classification, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("Found {} duplicate groups", classification.groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::groups::{Classification, Classifier};
use crate::progress::ProgressCallback;
use crate::scanner::{Hasher, ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Walker configuration (filters, excluded subtrees).
    pub walker_config: WalkerConfig,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files successfully scanned and hashed
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (kept records excluded)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Entries skipped because they could not be stat'ed or hashed
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that abort a scan before it starts.
///
/// Only the scan root itself can produce these; per-entry failures are
/// collected in [`ScanSummary::scan_errors`] instead.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The directory exists but cannot be listed.
    #[error("Cannot read directory {path}: {source}")]
    Unreadable {
        /// The scan root
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Check that `path` is a directory this process can list.
///
/// # Errors
///
/// Returns [`FinderError`] when the root is missing, not a directory or unreadable.
pub fn validate_root(path: &Path) -> Result<(), FinderError> {
    if !path.exists() {
        return Err(FinderError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }
    std::fs::read_dir(path).map_err(|source| FinderError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Duplicate finder that runs the scan → hash → classify pipeline.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under the given root.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the root does not exist, is not a
    /// directory or cannot be listed.
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Classification, ScanSummary), FinderError> {
        let start_time = Instant::now();
        validate_root(path)?;

        log::info!("Starting duplicate scan of {}", path.display());
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("scanning", 0);
        }

        let walker = Walker::new(path, self.config.walker_config.clone());
        let mut classifier = Classifier::new();
        let mut summary = ScanSummary::default();

        for result in walker.walk() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    self.report_error(&e);
                    summary.scan_errors.push(e);
                    continue;
                }
            };

            let hash = match self.hasher.full_hash(&record.path) {
                Ok(hash) => hash,
                Err(e) => {
                    let e = ScanError::from(e);
                    self.report_error(&e);
                    summary.scan_errors.push(e);
                    continue;
                }
            };

            summary.total_files += 1;
            summary.total_size += record.size;
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(summary.total_files, &record.path.to_string_lossy());
                callback.on_item_completed(record.size);
            }

            classifier.observe(record, hash);
        }

        let classification = classifier.finish();

        summary.duplicate_groups = classification.groups.len();
        summary.duplicate_files = classification.duplicate_count();
        summary.reclaimable_space = classification.reclaimable_space();
        summary.scan_duration = start_time.elapsed();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("scanning");
        }

        log::info!(
            "Scan complete: {} files, {} duplicate groups, {} duplicates ({} reclaimable), {} skipped",
            summary.total_files,
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.scan_errors.len()
        );

        Ok((classification, summary))
    }

    fn report_error(&self, error: &ScanError) {
        log::warn!("Skipping {}: {}", error.path().display(), error);
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_message(&format!("Skipped: {}", error));
        }
    }
}
