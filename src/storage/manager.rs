//! Storage Manager
//!
//! Owns the levels of sorted runs and coordinates reads across them.
//!
//! ## Responsibilities
//! - Hand out creation-ordered run ids
//! - Append flushed runs to level 0
//! - Search levels top → bottom for reads
//! - Hold the level layout that compaction rewrites

use crate::error::{LsmError, Result};
use crate::lookup::{Component, ProbeOutcome, ProbeStep, ReadTrace};
use crate::memtable::MemTableEntry;

use super::{RunId, SSTable};

/// Manages the storage layer
///
/// Level 0 is kept in append order (newest run last) and may hold overlapping
/// ranges. Levels >= 1 are kept sorted by `min_key`.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// Runs per level, index 0 = level 0
    pub(super) levels: Vec<Vec<SSTable>>,

    /// Next id for a new run
    next_run_id: u64,
}

impl StorageManager {
    /// Create empty storage with `max_levels` levels
    pub fn new(max_levels: usize) -> Self {
        Self {
            levels: vec![Vec::new(); max_levels],
            next_run_id: 1,
        }
    }

    /// Rebuild storage from restored levels, resuming ids above the largest
    pub(crate) fn from_levels(levels: Vec<Vec<SSTable>>) -> Self {
        let next_run_id = levels
            .iter()
            .flatten()
            .map(|run| run.id().0)
            .max()
            .map_or(1, |id| id + 1);
        Self {
            levels,
            next_run_id,
        }
    }

    /// Allocate the next run id
    pub(super) fn allocate_id(&mut self) -> RunId {
        let id = RunId(self.next_run_id);
        self.next_run_id += 1;
        id
    }

    /// Wrap flushed entries as a new level 0 run
    ///
    /// Fails with `InvalidArgument`, allocating no id, unless `entries` are
    /// strictly ascending by key.
    pub fn add_flushed_run(&mut self, entries: Vec<(String, MemTableEntry)>) -> Result<&SSTable> {
        if !SSTable::is_strictly_sorted(&entries) {
            return Err(LsmError::InvalidArgument(
                "flushed entries are not strictly ascending".to_string(),
            ));
        }
        Ok(self.push_flushed_run(entries))
    }

    /// Append drained memtable contents (already sorted) to level 0
    pub(crate) fn push_flushed_run(&mut self, entries: Vec<(String, MemTableEntry)>) -> &SSTable {
        let id = self.allocate_id();
        let level0 = &mut self.levels[0];
        level0.push(SSTable::from_sorted(id, 0, entries));
        &level0[level0.len() - 1]
    }

    /// Probe every level for `key`, newest data first
    ///
    /// Level 0 is searched newest → oldest. Levels >= 1 are searched in key
    /// order and runs whose range excludes `key` are skipped without counting
    /// as accessed. The first hit wins, tombstone or not.
    pub(crate) fn probe(&self, key: &str, trace: &mut ReadTrace) -> Option<MemTableEntry> {
        for (level, runs) in self.levels.iter().enumerate() {
            if runs.is_empty() {
                continue;
            }
            trace
                .path
                .push(ProbeStep::new(Component::Level { level }, ProbeOutcome::Checking));

            let ordered: Box<dyn Iterator<Item = &SSTable>> = if level == 0 {
                Box::new(runs.iter().rev())
            } else {
                Box::new(runs.iter())
            };

            for run in ordered {
                if level > 0 && !run.might_contain(key) {
                    continue;
                }

                trace.runs_accessed += 1;
                let component = Component::Run { level, id: run.id() };
                match run.get(key) {
                    Some(entry) => {
                        trace.path.push(ProbeStep::hit(component, entry));
                        return Some(entry.clone());
                    }
                    None => trace
                        .path
                        .push(ProbeStep::new(component, ProbeOutcome::NotFound)),
                }
            }
        }

        None
    }

    /// Runs in `level`, in stored order
    pub fn level(&self, level: usize) -> &[SSTable] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn levels(&self) -> &[Vec<SSTable>] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Get the number of runs in a level
    pub fn run_count(&self, level: usize) -> usize {
        self.level(level).len()
    }

    /// Total runs across all levels
    pub fn total_runs(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// Get the next run id (for testing/debugging)
    pub fn next_run_id(&self) -> RunId {
        RunId(self.next_run_id)
    }

    /// Pairs of runs in `level` whose key ranges overlap
    ///
    /// Levels >= 1 should always report none after a compaction.
    pub fn overlapping_runs(&self, level: usize) -> Vec<(RunId, RunId)> {
        let runs = self.level(level);
        let mut pairs = Vec::new();
        for (i, a) in runs.iter().enumerate() {
            for b in &runs[i + 1..] {
                if a.overlaps(b.min_key(), b.max_key()) {
                    pairs.push((a.id(), b.id()));
                }
            }
        }
        pairs
    }
}
