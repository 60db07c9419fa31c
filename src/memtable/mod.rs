//! MemTable Module
//!
//! In-memory write buffer for recent writes.
//!
//! ## Responsibilities
//! - Absorb puts and deletes with last-write-wins semantics
//! - Bound the buffer by distinct key count
//! - Drain to a key-sorted snapshot for SSTable creation
//!
//! ## Data Structure Choice
//! A plain BTreeMap:
//! - Ordered keys, so flushing needs no extra sort
//! - One entry per key by construction
//! - The engine is single-threaded; callers needing sharing wrap the whole
//!   engine (see `SharedEngine`)

mod table;

use serde::{Deserialize, Serialize};

pub use table::MemTable;

/// Entry stored in the MemTable and in SSTables
///
/// Serializes as a JSON string for live values and `null` for tombstones, so
/// no user value can ever collide with the deletion marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum MemTableEntry {
    /// A live value
    Value(String),

    /// A tombstone (deleted key)
    Tombstone,
}

impl MemTableEntry {
    pub fn is_tombstone(&self) -> bool {
        matches!(self, MemTableEntry::Tombstone)
    }

    /// The live value, or `None` for a tombstone
    pub fn as_value(&self) -> Option<&str> {
        match self {
            MemTableEntry::Value(v) => Some(v),
            MemTableEntry::Tombstone => None,
        }
    }
}

impl From<Option<String>> for MemTableEntry {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) => MemTableEntry::Value(v),
            None => MemTableEntry::Tombstone,
        }
    }
}

impl From<MemTableEntry> for Option<String> {
    fn from(entry: MemTableEntry) -> Self {
        match entry {
            MemTableEntry::Value(v) => Some(v),
            MemTableEntry::Tombstone => None,
        }
    }
}
