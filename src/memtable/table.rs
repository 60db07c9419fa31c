//! MemTable implementation
//!
//! BTreeMap-based write buffer bounded by distinct key count.

use std::collections::BTreeMap;

use super::MemTableEntry;

/// In-memory table for recent writes
///
/// The size bound is advisory: `put` never refuses a write, the engine checks
/// `is_full` and flushes before and after each write.
#[derive(Debug, Clone)]
pub struct MemTable {
    /// Latest entry per key
    data: BTreeMap<String, MemTableEntry>,

    /// Distinct keys at which the table reports full
    max_size: usize,
}

impl MemTable {
    /// Create a new empty MemTable holding up to `max_size` distinct keys
    pub fn new(max_size: usize) -> Self {
        Self {
            data: BTreeMap::new(),
            max_size,
        }
    }

    /// Get the entry for a key (value or tombstone)
    pub fn get(&self, key: &str) -> Option<&MemTableEntry> {
        self.data.get(key)
    }

    /// Insert or overwrite a key-value pair
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> String {
        let key = key.into();
        let message = format!("memtable put {}", key);
        self.data.insert(key, MemTableEntry::Value(value.into()));
        message
    }

    /// Delete a key (inserts a tombstone)
    pub fn delete(&mut self, key: impl Into<String>) -> String {
        let key = key.into();
        let message = format!("memtable delete {}", key);
        self.data.insert(key, MemTableEntry::Tombstone);
        message
    }

    /// Insert a raw entry (value or tombstone)
    pub(crate) fn insert(&mut self, key: String, entry: MemTableEntry) {
        self.data.insert(key, entry);
    }

    /// True once the distinct key count reaches the limit
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.max_size
    }

    /// Drain all entries in ascending key order, leaving the table empty
    pub fn flush(&mut self) -> Vec<(String, MemTableEntry)> {
        std::mem::take(&mut self.data).into_iter().collect()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Iterate entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MemTableEntry)> {
        self.data.iter()
    }
}
