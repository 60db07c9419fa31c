//! Tests for engine snapshots
//!
//! These tests verify:
//! - `state()` returns an owned, complete copy
//! - JSON layout: top-level keys, `[key, value]` pairs, null tombstones
//! - Restoring an engine from a snapshot, including from hand-written JSON
//! - Restored levels over capacity are compacted
//! - Rejection of inconsistent snapshots
//! - Save/load through files

use lsmsim::config::Config;
use lsmsim::engine::Engine;
use lsmsim::lookup::LookupValue;
use lsmsim::memtable::MemTableEntry;
use lsmsim::state::EngineState;
use lsmsim::storage::RunId;
use lsmsim::LsmError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Engine with data in the memtable, level 0 and level 1
fn populated_engine() -> Engine {
    let mut engine = Engine::new(
        Config::builder()
            .memtable_max_size(3)
            .l0_max_sstables(2)
            .max_levels(3)
            .build(),
    );
    for (k, v) in [("a", "1"), ("b", "2"), ("c", "3")] {
        engine.put(k, v).unwrap();
    }
    engine.compact(0).unwrap();
    for (k, v) in [("d", "4"), ("e", "5"), ("f", "6")] {
        engine.put(k, v).unwrap();
    }
    engine.delete("a").unwrap();
    engine.get("b");
    engine
}

// =============================================================================
// Snapshot Tests
// =============================================================================

#[test]
fn test_state_is_complete_copy() {
    let mut engine = populated_engine();

    let state = engine.state();

    assert_eq!(state.memtable, vec![("a".to_string(), MemTableEntry::Tombstone)]);
    assert_eq!(state.levels.len(), 3);
    assert_eq!(state.levels[0].len(), 1);
    assert_eq!(state.levels[1].len(), 1);
    assert_eq!(state.levels[1][0].min_key.as_deref(), Some("a"));
    assert_eq!(state.levels[1][0].max_key.as_deref(), Some("c"));
    assert_eq!(state.config, *engine.config());
    assert_eq!(state.metrics, *engine.metrics());
    assert_eq!(state.log.len(), engine.activity().len());
    assert_eq!(state.run_count(), 2);

    // Later writes do not leak into the snapshot
    engine.put("z", "26").unwrap();
    assert_eq!(state.memtable.len(), 1);
}

#[test]
fn test_state_json_layout() {
    let engine = populated_engine();

    let json = engine.state().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    for key in ["memtable", "levels", "log", "config", "metrics"] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(value["memtable"][0], serde_json::json!(["a", null]));
    assert_eq!(value["levels"][1][0]["data"][0], serde_json::json!(["a", "1"]));
    assert_eq!(value["config"]["memtableMaxSize"], 3);
    assert_eq!(value["config"]["l0MaxSSTables"], 2);
    assert_eq!(value["config"]["maxLevels"], 3);
    assert_eq!(value["metrics"]["logicalWrites"], 7);
    assert!(value["metrics"]["itemsWrittenToSSTables"].is_u64());
    assert!(value["log"][0]["message"].is_string());
}

// =============================================================================
// Restore Tests
// =============================================================================

#[test]
fn test_restore_round_trip() {
    let engine = populated_engine();
    let state = engine.state();

    let restored = Engine::from_state(EngineState::from_json(&state.to_json().unwrap()).unwrap())
        .unwrap();

    assert_eq!(restored.state(), state);
}

#[test]
fn test_restored_engine_serves_reads_and_resumes_ids() {
    let engine = populated_engine();
    let max_id = engine
        .storage()
        .levels()
        .iter()
        .flatten()
        .map(|run| run.id())
        .max()
        .unwrap();

    let mut restored = Engine::from_state(engine.state()).unwrap();

    assert!(restored.get("a").value.is_deleted());
    assert_eq!(restored.get("e").value, LookupValue::Found("5".into()));
    restored.put("q", "1").unwrap();
    let id = restored.flush().unwrap();
    assert!(id > max_id);
}

#[test]
fn test_restore_from_handwritten_json() {
    let json = r#"{
        "memtable": [["a", "1"], ["b", null]],
        "levels": [
            [],
            [{"id": 7, "level": 1, "minKey": "c", "maxKey": "d", "data": [["c", "3"], ["d", null]]}]
        ],
        "log": [],
        "config": {"maxLevels": 2},
        "metrics": {}
    }"#;

    let mut engine = Engine::from_state(EngineState::from_json(json).unwrap()).unwrap();

    assert_eq!(engine.config().memtable_max_size, Config::DEFAULT_MEMTABLE_MAX_SIZE);
    assert_eq!(engine.get("a").value, LookupValue::Found("1".into()));
    assert!(engine.get("b").value.is_deleted());
    assert_eq!(engine.get("c").value, LookupValue::Found("3".into()));
    assert!(engine.get("d").value.is_deleted());
    assert_eq!(engine.storage().next_run_id(), RunId(8));
}

#[test]
fn test_restore_compacts_over_capacity_level0() {
    let runs: Vec<String> = (1..=5)
        .map(|id| {
            format!(
                r#"{{"id": {id}, "level": 0, "minKey": "a", "maxKey": "k{id}", "data": [["a", "v{id}"], ["k{id}", "x"]]}}"#
            )
        })
        .collect();
    let json = format!(
        r#"{{"memtable": [], "levels": [[{}], [], [], [], []], "log": [], "config": {{}}, "metrics": {{}}}}"#,
        runs.join(", ")
    );

    let mut engine = Engine::from_state(EngineState::from_json(&json).unwrap()).unwrap();

    let config = *engine.config();
    assert_eq!(config.l0_max_sstables, 3);
    assert!(engine.level_run_count(0) <= config.level_capacity(0));
    assert_eq!(engine.storage().first_over_capacity(&config), None);
    assert_eq!(engine.level_run_count(1), 1);
    assert_eq!(engine.get("a").value, LookupValue::Found("v5".into()));
    assert_eq!(engine.get("k2").value, LookupValue::Found("x".into()));
}

#[test]
fn test_restore_rejects_level_count_mismatch() {
    let mut state = populated_engine().state();
    state.levels.pop();

    assert!(matches!(
        Engine::from_state(state),
        Err(LsmError::InvalidSnapshot(_))
    ));
}

#[test]
fn test_restore_rejects_unsorted_run() {
    let mut state = populated_engine().state();
    state.levels[1][0].data.reverse();

    assert!(matches!(
        Engine::from_state(state),
        Err(LsmError::InvalidSnapshot(_))
    ));
}

#[test]
fn test_restore_rejects_misplaced_run() {
    let mut state = populated_engine().state();
    let run = state.levels[1].remove(0);
    state.levels[2].push(run);

    assert!(matches!(
        Engine::from_state(state),
        Err(LsmError::InvalidSnapshot(_))
    ));
}

#[test]
fn test_restore_rejects_duplicate_run_ids() {
    let mut state = populated_engine().state();
    let copy = state.levels[0][0].clone();
    state.levels[0].push(copy);

    assert!(matches!(
        Engine::from_state(state),
        Err(LsmError::InvalidSnapshot(_))
    ));
}

#[test]
fn test_restore_rejects_oversized_memtable() {
    let mut state = populated_engine().state();
    for k in ["x", "y", "z"] {
        state
            .memtable
            .push((k.to_string(), MemTableEntry::Value("1".into())));
    }

    assert!(matches!(
        Engine::from_state(state),
        Err(LsmError::InvalidSnapshot(_))
    ));
}

#[test]
fn test_invalid_json_is_serialization_error() {
    assert!(matches!(
        EngineState::from_json("{not json"),
        Err(LsmError::Serialization(_))
    ));
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_save_and_load_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");
    let state = populated_engine().state();

    state.save_to_file(&path).unwrap();
    let loaded = EngineState::load_from_file(&path).unwrap();

    assert_eq!(loaded, state);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();

    let result = EngineState::load_from_file(&temp_dir.path().join("missing.json"));

    assert!(matches!(result, Err(LsmError::Io(_))));
}
