//! MemTable Tests
//!
//! Tests verify:
//! - Basic put/get/delete operations
//! - Last-write-wins per key
//! - Fullness by distinct key count
//! - Sorted, draining flush

use lsmsim::memtable::{MemTable, MemTableEntry};

fn value(v: &str) -> MemTableEntry {
    MemTableEntry::Value(v.to_string())
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let memtable = MemTable::new(5);
    assert_eq!(memtable.len(), 0);
    assert!(memtable.is_empty());
    assert!(!memtable.is_full());
    assert_eq!(memtable.max_size(), 5);
}

#[test]
fn test_put_and_get() {
    let mut memtable = MemTable::new(5);

    let confirmation = memtable.put("key1", "value1");

    assert!(confirmation.contains("key1"));
    assert_eq!(memtable.get("key1"), Some(&value("value1")));
}

#[test]
fn test_get_nonexistent_key() {
    let memtable = MemTable::new(5);
    assert_eq!(memtable.get("nonexistent"), None);
}

#[test]
fn test_put_overwrites_existing() {
    let mut memtable = MemTable::new(5);

    memtable.put("key1", "value1");
    memtable.put("key1", "value2");

    assert_eq!(memtable.len(), 1);
    assert_eq!(memtable.get("key1"), Some(&value("value2")));
}

// =============================================================================
// Delete / Tombstone Tests
// =============================================================================

#[test]
fn test_delete_creates_tombstone() {
    let mut memtable = MemTable::new(5);

    memtable.put("key1", "value1");
    memtable.delete("key1");

    assert_eq!(memtable.get("key1"), Some(&MemTableEntry::Tombstone));
    assert_eq!(memtable.len(), 1); // Tombstone still counts as entry
}

#[test]
fn test_delete_nonexistent_key_still_records_tombstone() {
    let mut memtable = MemTable::new(5);

    memtable.delete("ghost");

    assert_eq!(memtable.get("ghost"), Some(&MemTableEntry::Tombstone));
}

#[test]
fn test_put_after_delete_revives_key() {
    let mut memtable = MemTable::new(5);

    memtable.delete("key1");
    memtable.put("key1", "back");

    assert_eq!(memtable.get("key1"), Some(&value("back")));
}

// =============================================================================
// Fullness Tests
// =============================================================================

#[test]
fn test_is_full_counts_distinct_keys() {
    let mut memtable = MemTable::new(2);

    memtable.put("a", "1");
    memtable.put("a", "2");
    memtable.put("a", "3");
    assert!(!memtable.is_full());

    memtable.delete("b");
    assert!(memtable.is_full());
}

#[test]
fn test_put_does_not_enforce_bound() {
    let mut memtable = MemTable::new(1);

    memtable.put("a", "1");
    memtable.put("b", "2");

    assert_eq!(memtable.len(), 2);
    assert!(memtable.is_full());
}

// =============================================================================
// Flush Tests
// =============================================================================

#[test]
fn test_flush_returns_sorted_entries_and_clears() {
    let mut memtable = MemTable::new(10);

    memtable.put("cherry", "3");
    memtable.put("apple", "1");
    memtable.delete("banana");

    let entries = memtable.flush();

    assert_eq!(
        entries,
        vec![
            ("apple".to_string(), value("1")),
            ("banana".to_string(), MemTableEntry::Tombstone),
            ("cherry".to_string(), value("3")),
        ]
    );
    assert!(memtable.is_empty());
    assert_eq!(memtable.get("apple"), None);
}

#[test]
fn test_flush_empty_memtable() {
    let mut memtable = MemTable::new(3);
    assert!(memtable.flush().is_empty());
}

#[test]
fn test_flush_uses_byte_order() {
    let mut memtable = MemTable::new(10);

    memtable.put("b", "1");
    memtable.put("B", "2");
    memtable.put("a", "3");
    memtable.put("10", "4");
    memtable.put("9", "5");

    let keys: Vec<String> = memtable.flush().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["10", "9", "B", "a", "b"]);
}

// =============================================================================
// Entry Tests
// =============================================================================

#[test]
fn test_entry_helpers() {
    assert!(MemTableEntry::Tombstone.is_tombstone());
    assert_eq!(MemTableEntry::Tombstone.as_value(), None);
    assert!(!value("x").is_tombstone());
    assert_eq!(value("x").as_value(), Some("x"));
}

#[test]
fn test_entry_serializes_tombstone_as_null() {
    let json = serde_json::to_string(&vec![value("v"), MemTableEntry::Tombstone]).unwrap();
    assert_eq!(json, r#"["v",null]"#);

    let back: Vec<MemTableEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, vec![value("v"), MemTableEntry::Tombstone]);
}
