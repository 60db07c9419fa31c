//! SSTable implementation
//!
//! Sorted run: an immutable, key-sorted batch of entries living in one level.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LsmError, Result};
use crate::memtable::MemTableEntry;

/// Unique, creation-ordered SSTable identifier
///
/// Ids are handed out by a monotonically increasing counter, so a larger id
/// always means a newer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sst-{:06}", self.0)
    }
}

/// An immutable sorted run of entries
///
/// Entries are strictly ascending by key. Compaction replaces whole runs and
/// never edits one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SSTable {
    id: RunId,
    level: usize,
    entries: Vec<(String, MemTableEntry)>,
    /// Smallest key (for range filtering)
    min_key: Option<String>,
    /// Largest key (for range filtering)
    max_key: Option<String>,
}

impl SSTable {
    /// Build a run from entries sorted ascending by key
    ///
    /// Fails with `InvalidArgument` if keys are out of order or repeat.
    pub fn new(id: RunId, level: usize, entries: Vec<(String, MemTableEntry)>) -> Result<Self> {
        if !Self::is_strictly_sorted(&entries) {
            return Err(LsmError::InvalidArgument(format!(
                "run {} keys are not strictly ascending",
                id
            )));
        }
        Ok(Self::from_sorted(id, level, entries))
    }

    /// Build a run from entries the caller guarantees are strictly ascending
    pub(crate) fn from_sorted(
        id: RunId,
        level: usize,
        entries: Vec<(String, MemTableEntry)>,
    ) -> Self {
        debug_assert!(
            Self::is_strictly_sorted(&entries),
            "SSTable entries must be strictly ascending"
        );
        let min_key = entries.first().map(|(k, _)| k.clone());
        let max_key = entries.last().map(|(k, _)| k.clone());
        Self {
            id,
            level,
            entries,
            min_key,
            max_key,
        }
    }

    /// True if keys are strictly ascending (sorted, no duplicates)
    pub fn is_strictly_sorted(entries: &[(String, MemTableEntry)]) -> bool {
        entries.windows(2).all(|w| w[0].0 < w[1].0)
    }

    /// Get an entry by key, O(log n) binary search
    ///
    /// Returns the value or tombstone stored for `key`, `None` if this run
    /// holds no record of it.
    pub fn get(&self, key: &str) -> Option<&MemTableEntry> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// True iff `[min_key, max_key]` intersects `[min, max]`
    ///
    /// An empty run or an absent bound never overlaps.
    pub fn overlaps(&self, min: Option<&str>, max: Option<&str>) -> bool {
        match (self.min_key(), self.max_key(), min, max) {
            (Some(own_min), Some(own_max), Some(min), Some(max)) => {
                own_min <= max && own_max >= min
            }
            _ => false,
        }
    }

    /// Quick check if a key might be in this run (range check)
    /// Returns false if key is definitely outside [min_key, max_key]
    pub fn might_contain(&self, key: &str) -> bool {
        match (self.min_key(), self.max_key()) {
            (Some(min), Some(max)) => key >= min && key <= max,
            _ => false,
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn min_key(&self) -> Option<&str> {
        self.min_key.as_deref()
    }

    pub fn max_key(&self) -> Option<&str> {
        self.max_key.as_deref()
    }

    pub fn entries(&self) -> &[(String, MemTableEntry)] {
        &self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<(String, MemTableEntry)> {
        self.entries
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
