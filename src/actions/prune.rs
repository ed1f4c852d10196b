//! Bottom-up removal of empty directories.
//!
//! Directories are visited children before parents, so a parent that is
//! left empty only because its children were just removed is removed too.
//! The root itself is never removed and symlinks are never followed.
//! Running the pass twice is harmless: the second run finds nothing to do.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use super::{Action, ActionReporter};

/// Error removing or inspecting a directory.
#[derive(Debug, Error)]
pub enum PruneError {
    /// The directory could not be listed.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The directory was empty but removal failed.
    #[error("{source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PruneError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Remove { path, .. } => path,
        }
    }
}

/// Outcome of a prune pass.
#[derive(Debug, Default)]
pub struct BatchPruneResult {
    /// Directories removed, deepest first.
    pub removed: Vec<PathBuf>,
    pub failures: Vec<PruneError>,
}

impl BatchPruneResult {
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Remove every empty directory below `root`, deepest first.
///
/// Failures, including directories the walk cannot list, are reported and
/// collected; the pass always visits the whole tree.
pub fn remove_empty_dirs(root: &Path, reporter: &mut dyn ActionReporter) -> BatchPruneResult {
    let mut result = BatchPruneResult::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .contents_first(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                let e = PruneError::Read {
                    path: path.clone(),
                    source,
                };
                reporter.on_failure(Action::Prune, &path, &e);
                result.failures.push(e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        match is_empty_dir(path) {
            Ok(false) => {}
            Ok(true) => match fs::remove_dir(path) {
                Ok(()) => {
                    reporter.on_success(Action::Prune, path);
                    result.removed.push(path.to_path_buf());
                }
                Err(source) => {
                    let e = PruneError::Remove {
                        path: path.to_path_buf(),
                        source,
                    };
                    reporter.on_failure(Action::Prune, path, &e);
                    result.failures.push(e);
                }
            },
            Err(source) => {
                let e = PruneError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                reporter.on_failure(Action::Prune, path, &e);
                result.failures.push(e);
            }
        }
    }

    log::info!(
        "Pruned {} empty folder(s), {} failed",
        result.removed_count(),
        result.failure_count()
    );
    result
}
