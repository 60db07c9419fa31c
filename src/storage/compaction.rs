//! Leveled compaction
//!
//! Merges runs from one level into the next, keeping only the newest record
//! of every key.
//!
//! ## Selection
//! - Level 0: every run in the level
//! - Level i >= 1: the run at the front of the level
//! - Plus every run in the target level overlapping a selected run's range
//!
//! ## Merge order
//! Runs are visited newest first: lower level before higher level, larger id
//! before smaller id within a level. The first record seen for a key wins.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{LsmError, Result};
use crate::memtable::MemTableEntry;

use super::{RunId, SSTable, StorageManager};

/// What a single `compact_level` call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionSummary {
    pub source_level: usize,
    pub target_level: usize,
    /// Runs taken from the source level
    pub source_runs: Vec<RunId>,
    /// Overlapping runs taken from the target level
    pub target_runs: Vec<RunId>,
    /// Runs produced into the target level
    pub output_runs: Vec<RunId>,
    /// Entries written into the output runs
    pub items_written: u64,
    /// Older records shadowed by a newer record of the same key
    pub duplicates_discarded: usize,
    pub tombstones_dropped: usize,
}

impl StorageManager {
    /// Lowest compactable level holding more runs than its capacity
    pub fn first_over_capacity(&self, config: &Config) -> Option<usize> {
        let compactable = self.levels.len().saturating_sub(1);
        (0..compactable).find(|&level| self.levels[level].len() > config.level_capacity(level))
    }

    /// Compact `level` into `level + 1`
    ///
    /// Returns `Ok(None)` when the level holds no runs. Fails with
    /// `InvalidArgument` for the last level or a level that does not exist.
    pub fn compact_level(
        &mut self,
        level: usize,
        config: &Config,
    ) -> Result<Option<CompactionSummary>> {
        let last_level = self.levels.len().saturating_sub(1);
        if level >= last_level {
            return Err(LsmError::InvalidArgument(format!(
                "cannot compact level {}: last level is {}",
                level, last_level
            )));
        }
        let target = level + 1;

        // Step 1: Take the source runs out of their level
        let sources: Vec<SSTable> = if level == 0 {
            std::mem::take(&mut self.levels[0])
        } else if self.levels[level].is_empty() {
            Vec::new()
        } else {
            vec![self.levels[level].remove(0)]
        };

        if sources.is_empty() {
            tracing::debug!("level {} has no runs to compact", level);
            return Ok(None);
        }

        // Step 2: Take every target run overlapping any source range
        let mut overlap_ids: Vec<RunId> = Vec::new();
        for source in &sources {
            let (Some(min), Some(max)) = (source.min_key(), source.max_key()) else {
                continue;
            };
            for run in &self.levels[target] {
                if run.overlaps(Some(min), Some(max)) && !overlap_ids.contains(&run.id()) {
                    overlap_ids.push(run.id());
                }
            }
        }

        let (overlapping, untouched): (Vec<SSTable>, Vec<SSTable>) =
            std::mem::take(&mut self.levels[target])
                .into_iter()
                .partition(|run| overlap_ids.contains(&run.id()));
        self.levels[target] = untouched;

        let source_runs: Vec<RunId> = sources.iter().map(SSTable::id).collect();
        let target_runs: Vec<RunId> = overlapping.iter().map(SSTable::id).collect();

        // Step 3: Newest first: lower level, then larger id
        let mut merge_set: Vec<SSTable> = sources.into_iter().chain(overlapping).collect();
        merge_set.sort_by(|a, b| a.level().cmp(&b.level()).then_with(|| b.id().cmp(&a.id())));

        let mut newest: HashMap<String, MemTableEntry> = HashMap::new();
        let mut duplicates_discarded = 0;
        for run in merge_set {
            for (key, entry) in run.into_entries() {
                if newest.contains_key(&key) {
                    duplicates_discarded += 1;
                } else {
                    newest.insert(key, entry);
                }
            }
        }

        // Step 4: Tombstones are dropped once the merge lands in the last level
        let drop_tombstones = level >= config.max_levels.saturating_sub(2);
        let before = newest.len();
        let mut live: Vec<(String, MemTableEntry)> = newest
            .into_iter()
            .filter(|(_, entry)| !(drop_tombstones && entry.is_tombstone()))
            .collect();
        let tombstones_dropped = before - live.len();
        live.sort_by(|a, b| a.0.cmp(&b.0));

        // Step 5: Chunk into new runs for the target level
        let chunk_size = config.sstable_max_items.max(1);
        let mut output_runs = Vec::new();
        let mut items_written = 0u64;
        let mut remaining = live.into_iter().peekable();
        while remaining.peek().is_some() {
            let chunk: Vec<(String, MemTableEntry)> = remaining.by_ref().take(chunk_size).collect();
            items_written += chunk.len() as u64;
            let id = self.allocate_id();
            output_runs.push(id);
            self.levels[target].push(SSTable::from_sorted(id, target, chunk));
        }

        // Target is always >= 1: keep it ordered by min key, empty ranges first
        self.levels[target].sort_by(|a, b| a.min_key().cmp(&b.min_key()));

        tracing::debug!(
            "compacted L{} → L{}: {} source, {} overlapping, {} output runs, {} items",
            level,
            target,
            source_runs.len(),
            target_runs.len(),
            output_runs.len(),
            items_written
        );

        Ok(Some(CompactionSummary {
            source_level: level,
            target_level: target,
            source_runs,
            target_runs,
            output_runs,
            items_written,
            duplicates_discarded,
            tombstones_dropped,
        }))
    }
}
