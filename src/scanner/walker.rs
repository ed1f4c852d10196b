//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and capturing one [`FileRecord`] per regular file. Traversal is
//! single-threaded and children are visited in file-name order, so the
//! discovery order for an unchanged tree is reproducible between runs.
//!
//! # Features
//!
//! - Regular files only: directories, symlinks and special files are never yielded
//! - Symlinks are never followed, so link cycles cannot be entered
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Hidden entry filtering and excluded subtrees
//! - Per-entry errors are yielded and the walk continues
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let (files, errors): (Vec<_>, Vec<_>) = walker.walk().partition(Result::is_ok);
//! println!("{} files, {} unreadable entries", files.len(), errors.len());
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError, WalkerConfig};

/// Directory walker for sequential file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Build gitignore matcher from config patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path should be ignored based on configured patterns.
    fn should_ignore(&self, path: &Path, is_dir: bool, gitignore: Option<&Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };

        // Gitignore matching expects paths relative to the root with forward slashes.
        let relative_path = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative_path.to_string_lossy();
        let normalized_path = if cfg!(windows) {
            path_str.replace('\\', "/")
        } else {
            path_str.into_owned()
        };

        gi.matched(normalized_path, is_dir).is_ignore()
    }

    /// Decide whether the walk should enter or yield this entry at all.
    fn admits(&self, entry: &DirEntry, gitignore: Option<&Gitignore>) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        if self.config.skip_hidden && is_hidden(entry) {
            log::trace!("Skipping hidden entry: {}", entry.path().display());
            return false;
        }

        let is_dir = entry.file_type().is_dir();
        if is_dir && self.config.exclude_dirs.iter().any(|d| entry.path() == d) {
            log::debug!("Skipping excluded directory: {}", entry.path().display());
            return false;
        }

        if self.should_ignore(entry.path(), is_dir, gitignore) {
            log::trace!("Ignoring: {}", entry.path().display());
            return false;
        }

        true
    }

    /// Walk the directory tree, yielding file records in discovery order.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; a single unreadable entry never aborts the walk.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let gitignore = self.build_gitignore();

        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.admits(entry, gitignore.as_ref()))
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    // Symlinks, directories and special files are not records
                    if !entry.file_type().is_file() {
                        return None;
                    }

                    match entry.metadata() {
                        Ok(metadata) => Some(Ok(Self::record_for(entry.into_path(), &metadata))),
                        Err(e) => {
                            let path = entry.into_path();
                            Some(Err(self.handle_walk_error(path, e)))
                        }
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    Some(Err(self.handle_walk_error(path, e)))
                }
            })
    }

    /// Capture the record for a regular file from one metadata snapshot.
    fn record_for(path: PathBuf, metadata: &Metadata) -> FileRecord {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = creation_time(metadata).unwrap_or(modified);
        log::trace!("Discovered {} ({} bytes)", path.display(), metadata.len());
        FileRecord::new(path, metadata.len(), modified, created)
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, path: PathBuf, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.io_error().map(std::io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("Entry vanished during scan: {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                let source = error
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                ScanError::Io { path, source }
            }
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Best available creation timestamp: birth time, else the unix inode
/// change time.
fn creation_time(metadata: &Metadata) -> Option<SystemTime> {
    if let Ok(created) = metadata.created() {
        return Some(created);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        use std::time::Duration;

        let secs = u64::try_from(metadata.ctime()).ok()?;
        let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
        SystemTime::UNIX_EPOCH.checked_add(Duration::new(secs, nanos))
    }

    #[cfg(not(unix))]
    {
        None
    }
}
