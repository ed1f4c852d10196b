//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config PATH`, else `config.toml` in the platform
//!    config directory when it exists
//! 3. Environment variables prefixed with `DUPSWEEP_` (e.g. `DUPSWEEP_BACKUP_DIR`)
//! 4. Command-line flags
//!
//! ```toml
//! scan_root = "/data/photos"
//! backup_dir = "/data/dupsweep-backup"
//! log_file = "/data/duplicate_files_log.txt"
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules"]
//! ```

use std::path::{Component, Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::duplicates::{validate_root, FinderError};
use crate::scanner::WalkerConfig;

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Default backup directory, relative to the working directory.
pub const DEFAULT_BACKUP_DIR: &str = "dupsweep-backup";

/// Default event log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "duplicate_files_log.txt";

/// Configuration errors. All of them are fatal and raised before any scan.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be parsed or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    /// No layer supplied a scan root.
    #[error("no scan root given (pass SCAN_ROOT, set scan_root in the config file or DUPSWEEP_SCAN_ROOT)")]
    MissingScanRoot,

    /// The scan root is missing, not a directory or unreadable.
    #[error("scan root is not accessible: {0}")]
    ScanRoot(#[from] FinderError),

    /// The config file could not be written.
    #[error("cannot write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No config file was given and the platform has no config directory.
    #[error("no config file location (pass --config FILE)")]
    NoConfigPath,

    /// The configuration could not be rendered as TOML.
    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A path could not be resolved to its canonical form.
    #[error("cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory to deduplicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_root: Option<PathBuf>,

    /// Destination for duplicate copies before deletion.
    pub backup_dir: PathBuf,

    /// Append-only record of deletions, folder removals and errors.
    pub log_file: PathBuf,

    /// Skip hidden files and directories during the scan.
    #[serde(default)]
    pub skip_hidden: bool,

    /// Gitignore-style patterns excluded from the scan.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_root: None,
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            skip_hidden: false,
            ignore_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Platform-specific path of the default config file.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupsweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the defaults < file < environment stack.
    ///
    /// `config_file` is merged when given; otherwise the platform config
    /// file is merged if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if `config_file` does not exist.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match config_file {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_config_path().filter(|p| p.is_file()) {
                    log::debug!("Loading config from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load every layer and apply the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer is malformed.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config: Config = Self::figment(cli.config.as_deref())?
            .extract()
            .map_err(Box::new)?;
        config.apply_cli(cli);
        Ok(config)
    }

    /// Write this configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Write`] or [`ConfigError::Serialize`] on failure.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)
    }

    /// Save to `--config` when given, else to [`Config::default_config_path`].
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigPath`] when neither location exists,
    /// or the errors of [`Config::save`].
    pub fn save_for(&self, cli: &Cli) -> Result<PathBuf, ConfigError> {
        let path = cli
            .config
            .clone()
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;
        self.save(&path)?;
        log::info!("Configuration written to {}", path.display());
        Ok(path)
    }

    /// Overlay the command-line flags. Ignore patterns are appended.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref root) = cli.scan_root {
            self.scan_root = Some(root.clone());
        }
        if let Some(ref dir) = cli.backup_dir {
            self.backup_dir = dir.clone();
        }
        if let Some(ref file) = cli.log_file {
            self.log_file = file.clone();
        }
        if cli.skip_hidden {
            self.skip_hidden = true;
        }
        self.ignore_patterns
            .extend(cli.ignore_patterns.iter().cloned());
    }

    /// Check the scan root and resolve every path to its canonical form.
    ///
    /// `..` components and symlinks are resolved so the backup directory
    /// compares equal to the paths the walker yields under the scan root.
    /// Paths that do not exist yet are resolved through their deepest
    /// existing ancestor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingScanRoot`] or [`ConfigError::ScanRoot`]
    /// when there is nothing accessible to scan.
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let root = self.scan_root.ok_or(ConfigError::MissingScanRoot)?;
        validate_root(&root)?;

        Ok(ValidatedConfig {
            scan_root: resolve(&root)?,
            backup_dir: resolve(&self.backup_dir)?,
            log_file: resolve(&self.log_file)?,
            skip_hidden: self.skip_hidden,
            ignore_patterns: self.ignore_patterns,
        })
    }
}

fn resolve(path: &Path) -> Result<PathBuf, ConfigError> {
    let resolve_err = |source| ConfigError::Resolve {
        path: path.to_path_buf(),
        source,
    };
    let absolute = std::path::absolute(path).map_err(resolve_err)?;

    // Components below the deepest existing ancestor, innermost first
    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    let mut resolved = loop {
        match existing.canonicalize() {
            Ok(resolved) => break resolved,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match (existing.parent(), existing.components().next_back()) {
                    (Some(parent), Some(last)) => {
                        missing.push(last);
                        existing = parent;
                    }
                    _ => return Err(resolve_err(e)),
                }
            }
            Err(e) => return Err(resolve_err(e)),
        }
    };

    for component in missing.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

/// Configuration with an accessible scan root and canonical paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub scan_root: PathBuf,
    pub backup_dir: PathBuf,
    pub log_file: PathBuf,
    pub skip_hidden: bool,
    pub ignore_patterns: Vec<String>,
}

impl ValidatedConfig {
    /// Walker settings for the scan. The backup directory is never scanned.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.skip_hidden, self.ignore_patterns.clone())
            .with_excluded_dir(self.backup_dir.clone())
    }
}
