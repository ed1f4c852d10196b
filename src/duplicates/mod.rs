//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Scanning and hashing every regular file under a root ([`finder`])
//! - Applying the retention rule per digest ([`groups`])

pub mod finder;
pub mod groups;

pub use finder::{validate_root, DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{classify, Classification, Classifier, DuplicateGroup};
