//! Engine Module
//!
//! The LSM engine that coordinates all components.
//!
//! ## Responsibilities
//! - Route writes to the MemTable, flushing when it fills
//! - Trigger leveled compaction whenever a level exceeds its capacity
//! - Serve reads newest data first, with a probe trace
//! - Track metrics and the activity log
//! - Export and restore full snapshots

use std::collections::HashSet;

use crate::activity::ActivityLog;
use crate::command::{Command, Response};
use crate::config::Config;
use crate::error::{LsmError, Result};
use crate::lookup::{Component, Lookup, LookupValue, ProbeOutcome, ProbeStep, ReadTrace};
use crate::memtable::{MemTable, MemTableEntry};
use crate::metrics::Metrics;
use crate::state::{EngineState, RunState};
use crate::storage::{CompactionSummary, RunId, SSTable, StorageManager};

/// The LSM storage engine
///
/// ## Execution Model
///
/// Single-threaded and synchronous. Every operation, including any flush and
/// compaction cascade it triggers, runs to completion before returning.
/// Callers sharing one instance across threads go through `SharedEngine`,
/// which puts the whole engine behind one lock.
///
/// ## Failure Model
///
/// No failure is fatal. A rejected operation is logged to the activity log
/// and to `tracing`, and leaves the engine unchanged.
#[derive(Debug, Clone)]
pub struct Engine {
    /// Engine configuration (replaced only by `reset`)
    config: Config,

    /// In-memory write buffer
    memtable: MemTable,

    /// Leveled sorted runs
    storage: StorageManager,

    metrics: Metrics,

    activity: ActivityLog,
}

impl Engine {
    /// Create an empty engine
    ///
    /// Zero (unset) config fields fall back to their defaults.
    pub fn new(config: Config) -> Self {
        let config = config.normalized();
        tracing::info!(
            "engine initialized: memtable={} l0={} factor={} run_items={} levels={}",
            config.memtable_max_size,
            config.l0_max_sstables,
            config.level_max_sstables_factor,
            config.sstable_max_items,
            config.max_levels
        );

        Self {
            config,
            memtable: MemTable::new(config.memtable_max_size),
            storage: StorageManager::new(config.max_levels),
            metrics: Metrics::default(),
            activity: ActivityLog::new(),
        }
    }

    /// Restore an engine from a snapshot produced by `state`
    ///
    /// Fails with `InvalidSnapshot` if the level count does not match the
    /// config, a run is unsorted or misplaced, ids repeat, or the memtable
    /// holds empty, duplicate or too many keys. Levels left over capacity are
    /// compacted before the engine is returned.
    pub fn from_state(state: EngineState) -> Result<Self> {
        let config = state.config.normalized();

        if state.levels.len() != config.max_levels {
            return Err(LsmError::InvalidSnapshot(format!(
                "snapshot has {} levels, config expects {}",
                state.levels.len(),
                config.max_levels
            )));
        }
        if state.memtable.len() > config.memtable_max_size {
            return Err(LsmError::InvalidSnapshot(format!(
                "memtable holds {} keys, limit is {}",
                state.memtable.len(),
                config.memtable_max_size
            )));
        }

        let mut memtable = MemTable::new(config.memtable_max_size);
        for (key, entry) in state.memtable {
            if key.is_empty() {
                return Err(LsmError::InvalidSnapshot("memtable holds an empty key".into()));
            }
            if memtable.get(&key).is_some() {
                return Err(LsmError::InvalidSnapshot(format!(
                    "memtable holds key {} twice",
                    key
                )));
            }
            memtable.insert(key, entry);
        }

        let mut seen = HashSet::new();
        let mut levels: Vec<Vec<SSTable>> = Vec::with_capacity(state.levels.len());
        for (level, runs) in state.levels.into_iter().enumerate() {
            let mut restored = Vec::with_capacity(runs.len());
            for run in runs {
                if !seen.insert(run.id) {
                    return Err(LsmError::InvalidSnapshot(format!(
                        "run id {} appears twice",
                        run.id
                    )));
                }
                restored.push(run.into_sstable(level)?);
            }
            levels.push(restored);
        }

        let storage = StorageManager::from_levels(levels);
        tracing::info!(
            "engine restored: {} memtable keys, {} runs",
            memtable.len(),
            storage.total_runs()
        );

        let mut engine = Self {
            config,
            memtable,
            storage,
            metrics: state.metrics,
            activity: ActivityLog::from_entries(state.log),
        };
        // A snapshot may hold more runs than its config allows
        engine.maybe_compact();
        Ok(engine)
    }

    /// Execute a command
    ///
    /// Routes commands to the matching operation
    pub fn execute(&mut self, command: Command) -> Result<Response> {
        match command {
            Command::Put { key, value } => {
                self.put(&key, &value)?;
                Ok(Response::Ok(format!("put {}", key)))
            }
            Command::Delete { key } => {
                self.delete(&key)?;
                Ok(Response::Ok(format!("deleted {}", key)))
            }
            Command::Get { key } => Ok(Response::Lookup(self.get(&key))),
            Command::Flush => Ok(Response::Flushed(self.flush())),
            Command::Compact { level } => Ok(Response::Compacted(self.compact(level)?)),
            Command::State => Ok(Response::State(Box::new(self.state()))),
            Command::Metrics => Ok(Response::Metrics(self.metrics)),
            Command::Reset { config } => {
                self.reset(config);
                Ok(Response::Ok("reset".to_string()))
            }
        }
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Reject an empty key
    /// 2. Flush a full MemTable first
    /// 3. Write to MemTable
    /// 4. Flush again if that filled it
    /// 5. Run the compaction trigger
    pub fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.write(key, MemTableEntry::Value(value.to_string()))
    }

    /// Delete a key
    ///
    /// Writes a tombstone; older values stay shadowed until compaction
    /// drops it.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.write(key, MemTableEntry::Tombstone)
    }

    fn write(&mut self, key: &str, entry: MemTableEntry) -> Result<()> {
        let op = if entry.is_tombstone() { "delete" } else { "put" };

        if key.is_empty() {
            return Err(self.reject(LsmError::InvalidArgument(format!(
                "{} requires a non-empty key",
                op
            ))));
        }

        if self.memtable.is_full() {
            self.flush_memtable();
        }
        if self.memtable.is_full() {
            return Err(self.reject(LsmError::WriteRejected(format!(
                "memtable still full after flush, {} {} dropped",
                op, key
            ))));
        }

        let event = match entry {
            MemTableEntry::Value(value) => {
                let event = format!("PUT {} = {}", key, value);
                let confirmation = self.memtable.put(key, value);
                tracing::trace!("{}", confirmation);
                event
            }
            MemTableEntry::Tombstone => {
                let confirmation = self.memtable.delete(key);
                tracing::trace!("{}", confirmation);
                format!("DELETE {}", key)
            }
        };
        self.metrics.logical_writes += 1;
        self.activity.record(event);

        if self.memtable.is_full() {
            self.flush_memtable();
        }

        self.maybe_compact();
        Ok(())
    }

    /// Flush memtable to level 0 (public API)
    ///
    /// Forces a flush regardless of memtable size, then runs the compaction
    /// trigger. Returns the new run's id, or `None` if the memtable was empty.
    pub fn flush(&mut self) -> Option<RunId> {
        let id = self.flush_memtable();
        self.maybe_compact();
        id
    }

    /// Drain the memtable into a new level 0 run
    fn flush_memtable(&mut self) -> Option<RunId> {
        if self.memtable.is_empty() {
            tracing::debug!("flush skipped: memtable is empty");
            self.activity.record("FLUSH: nothing to flush");
            return None;
        }

        let entries = self.memtable.flush();
        let run = self.storage.push_flushed_run(entries);
        let (id, len) = (run.id(), run.len());

        self.metrics.items_written_to_sstables += len as u64;
        tracing::debug!("flushed memtable to L0 {} ({} entries)", id, len);
        self.activity
            .record(format!("FLUSH memtable → L0 {} ({} entries)", id, len));
        Some(id)
    }

    // =========================================================================
    // Compaction
    // =========================================================================

    /// Compact `level` into the next level, then cascade as needed
    ///
    /// Returns `Ok(None)` if the level holds no runs. The last level cannot
    /// be compacted and yields `InvalidArgument`.
    pub fn compact(&mut self, level: usize) -> Result<Option<CompactionSummary>> {
        let summary = self.compact_level(level).map_err(|e| self.reject(e))?;
        self.maybe_compact();
        Ok(summary)
    }

    /// Compact every level over capacity, lowest first, until none is
    fn maybe_compact(&mut self) {
        while let Some(level) = self.storage.first_over_capacity(&self.config) {
            let outcome = self.compact_level(level);
            debug_assert!(
                matches!(outcome, Ok(Some(_))),
                "level {} over capacity but compaction did nothing",
                level
            );
            if !matches!(outcome, Ok(Some(_))) {
                tracing::error!("level {} over capacity but compaction did nothing", level);
                break;
            }
        }
    }

    fn compact_level(&mut self, level: usize) -> Result<Option<CompactionSummary>> {
        let summary = self.storage.compact_level(level, &self.config)?;

        match &summary {
            Some(s) => {
                self.metrics.items_written_to_sstables += s.items_written;
                tracing::info!(
                    "compaction L{} → L{}: merged {} runs into {}, {} duplicates and {} tombstones dropped",
                    s.source_level,
                    s.target_level,
                    s.source_runs.len() + s.target_runs.len(),
                    s.output_runs.len(),
                    s.duplicates_discarded,
                    s.tombstones_dropped
                );
                self.activity.record(format!(
                    "COMPACT L{} → L{}: {} runs in, {} runs out, {} items written",
                    s.source_level,
                    s.target_level,
                    s.source_runs.len() + s.target_runs.len(),
                    s.output_runs.len(),
                    s.items_written
                ));
            }
            None => {
                self.activity
                    .record(format!("COMPACT L{}: nothing to compact", level));
            }
        }

        Ok(summary)
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Get a value by key
    ///
    /// Search order:
    /// 1. MemTable (most recent writes)
    /// 2. Level 0, newest run first
    /// 3. Levels 1.., in key order, skipping runs whose range excludes `key`
    ///
    /// The first record found is authoritative: a tombstone reports
    /// `Deleted` without probing further. An empty key is rejected and
    /// reported as absent with an empty path.
    pub fn get(&mut self, key: &str) -> Lookup {
        if key.is_empty() {
            self.reject(LsmError::InvalidArgument(
                "get requires a non-empty key".to_string(),
            ));
            return Lookup::absent(Vec::new());
        }

        self.metrics.logical_reads += 1;
        self.metrics.memtable_lookups_for_read += 1;

        let mut trace = ReadTrace::default();
        let found = match self.memtable.get(key) {
            Some(entry) => {
                trace.path.push(ProbeStep::hit(Component::MemTable, entry));
                Some(entry.clone())
            }
            None => {
                trace
                    .path
                    .push(ProbeStep::new(Component::MemTable, ProbeOutcome::NotFound));
                self.storage.probe(key, &mut trace)
            }
        };
        self.metrics.sstables_accessed_for_read += trace.runs_accessed;

        let value = found
            .as_ref()
            .map_or(LookupValue::Absent, LookupValue::from);
        let outcome = match &value {
            LookupValue::Found(v) => format!("found {}", v),
            LookupValue::Deleted => "deleted".to_string(),
            LookupValue::Absent => "not found".to_string(),
        };
        tracing::trace!("get {}: {} after {} runs", key, outcome, trace.runs_accessed);
        self.activity.record(format!("GET {}: {}", key, outcome));

        Lookup {
            value,
            path: trace.path,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Replace the config and discard all data, log entries and metrics
    pub fn reset(&mut self, config: Config) {
        *self = Self::new(config);
    }

    /// Owned snapshot of the whole engine
    pub fn state(&self) -> EngineState {
        EngineState {
            memtable: self
                .memtable
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            levels: self
                .storage
                .levels()
                .iter()
                .map(|runs| runs.iter().map(RunState::from).collect())
                .collect(),
            log: self.activity.entries().cloned().collect(),
            config: self.config,
            metrics: self.metrics,
        }
    }

    /// Log a rejected operation and hand the error back
    fn reject(&mut self, err: LsmError) -> LsmError {
        tracing::warn!("{}", err);
        self.activity.record(format!("ERROR: {}", err));
        err
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Get the memtable entry count
    pub fn memtable_len(&self) -> usize {
        self.memtable.len()
    }

    /// Get the number of runs in a level
    pub fn level_run_count(&self, level: usize) -> usize {
        self.storage.run_count(level)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
