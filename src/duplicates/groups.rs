//! Duplicate grouping and the retention rule.
//!
//! # Overview
//!
//! Records are fed to a [`Classifier`] in scan-discovery order together with
//! their content digest. For every digest the classifier holds one
//! "currently kept" record:
//!
//! - a newcomer whose modification time is strictly later than the kept
//!   record's takes its place, and the previous kept record is demoted to
//!   the duplicate list;
//! - otherwise the newcomer is appended to the duplicate list.
//!
//! Equal timestamps therefore always keep the earliest-discovered record.
//! This is an incremental reduction, so the outcome depends on the order in
//! which records arrive. It is deliberately not replaced by a sort.
//!
//! # Example
//!
//! ```
//! use dupsweep::duplicates::Classifier;
//! use dupsweep::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::{Duration, SystemTime};
//!
//! let at = |secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
//! let mut classifier = Classifier::new();
//! classifier.observe(FileRecord::new(PathBuf::from("/a/1.txt"), 1, at(100), at(100)), [7u8; 32]);
//! classifier.observe(FileRecord::new(PathBuf::from("/b/2.txt"), 1, at(200), at(200)), [7u8; 32]);
//!
//! let classification = classifier.finish();
//! let group = &classification.groups[0];
//! assert_eq!(group.kept.path, PathBuf::from("/b/2.txt"));
//! assert_eq!(group.duplicates[0].path, PathBuf::from("/a/1.txt"));
//! ```

use std::collections::HashMap;

use crate::scanner::{FileRecord, Hash};

/// Records sharing one digest, split into the survivor and the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the shared content
    pub hash: Hash,
    /// The single record that is never deleted
    pub kept: FileRecord,
    /// Every other record, in the order it left (or never entered) the kept slot
    pub duplicates: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Number of files in this group, kept record included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.duplicates.len() + 1
    }

    /// A group always holds its kept record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bytes reclaimed by deleting every duplicate.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.duplicates.iter().map(|f| f.size).sum()
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        crate::scanner::hash_to_hex(&self.hash)
    }
}

/// Per-digest state while records are still arriving.
#[derive(Debug)]
struct Slot {
    hash: Hash,
    kept: FileRecord,
    duplicates: Vec<FileRecord>,
}

/// Incremental, order-sensitive classifier.
///
/// Slots are stored in a `Vec` in order of first digest discovery and
/// looked up through a digest index, so the output order never depends on
/// hash map iteration order.
#[derive(Debug, Default)]
pub struct Classifier {
    index: HashMap<Hash, usize>,
    slots: Vec<Slot>,
    observed: usize,
}

impl Classifier {
    /// Create an empty classifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next record in discovery order.
    pub fn observe(&mut self, record: FileRecord, hash: Hash) {
        self.observed += 1;

        let Some(&position) = self.index.get(&hash) else {
            self.index.insert(hash, self.slots.len());
            self.slots.push(Slot {
                hash,
                kept: record,
                duplicates: Vec::new(),
            });
            return;
        };

        let slot = &mut self.slots[position];
        if record.modified > slot.kept.modified {
            let demoted = std::mem::replace(&mut slot.kept, record);
            log::trace!(
                "Newer copy {} replaces {} as kept",
                slot.kept.path.display(),
                demoted.path.display()
            );
            slot.duplicates.push(demoted);
        } else {
            log::trace!(
                "{} is a duplicate of {}",
                record.path.display(),
                slot.kept.path.display()
            );
            slot.duplicates.push(record);
        }
    }

    /// Number of records observed so far.
    #[must_use]
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Finish classification.
    #[must_use]
    pub fn finish(self) -> Classification {
        let mut groups = Vec::new();
        let mut singletons = Vec::new();

        for slot in self.slots {
            if slot.duplicates.is_empty() {
                singletons.push(slot.kept);
            } else {
                groups.push(DuplicateGroup {
                    hash: slot.hash,
                    kept: slot.kept,
                    duplicates: slot.duplicates,
                });
            }
        }

        Classification { groups, singletons }
    }
}

/// Result of classifying one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// One group per digest seen two or more times, in first-seen order
    pub groups: Vec<DuplicateGroup>,
    /// Records whose digest was seen exactly once
    pub singletons: Vec<FileRecord>,
}

impl Classification {
    /// Whether any digest was seen more than once.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Kept records of every duplicate group.
    pub fn kept(&self) -> impl Iterator<Item = &FileRecord> {
        self.groups.iter().map(|g| &g.kept)
    }

    /// Every duplicate record across all groups.
    pub fn duplicates(&self) -> impl Iterator<Item = &FileRecord> {
        self.groups.iter().flat_map(|g| g.duplicates.iter())
    }

    /// Total number of duplicate records.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.duplicates.len()).sum()
    }

    /// Total bytes held by duplicate records.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }
}

/// Classify an already-hashed sequence of records.
///
/// Pure, in-memory; running it twice over the same sequence gives the same
/// result.
#[must_use]
pub fn classify(records: impl IntoIterator<Item = (FileRecord, Hash)>) -> Classification {
    let mut classifier = Classifier::new();
    for (record, hash) in records {
        classifier.observe(record, hash);
    }
    classifier.finish()
}
