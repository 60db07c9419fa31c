//! Engine snapshots
//!
//! `EngineState` is an owned, read-only copy of everything an engine holds.
//! It serializes to JSON with stable top-level keys (`memtable`, `levels`,
//! `log`, `config`, `metrics`) and `[key, value]` arrays for entries, where a
//! tombstone is `null`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activity::LogEntry;
use crate::config::Config;
use crate::error::{LsmError, Result};
use crate::memtable::MemTableEntry;
use crate::metrics::Metrics;
use crate::storage::{RunId, SSTable};

/// Full engine snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Memtable entries in ascending key order
    pub memtable: Vec<(String, MemTableEntry)>,
    /// Runs per level, in stored order
    pub levels: Vec<Vec<RunState>>,
    /// Activity log, newest first
    pub log: Vec<LogEntry>,
    pub config: Config,
    pub metrics: Metrics,
}

/// Snapshot of one sorted run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub id: RunId,
    pub level: usize,
    pub min_key: Option<String>,
    pub max_key: Option<String>,
    pub data: Vec<(String, MemTableEntry)>,
}

impl From<&SSTable> for RunState {
    fn from(run: &SSTable) -> Self {
        Self {
            id: run.id(),
            level: run.level(),
            min_key: run.min_key().map(str::to_owned),
            max_key: run.max_key().map(str::to_owned),
            data: run.entries().to_vec(),
        }
    }
}

impl RunState {
    /// Rebuild the run for `level`, checking ordering and placement
    ///
    /// The key range is recomputed from the data; stored bounds are ignored.
    pub(crate) fn into_sstable(self, level: usize) -> Result<SSTable> {
        if self.level != level {
            return Err(LsmError::InvalidSnapshot(format!(
                "run {} tagged level {} but stored in level {}",
                self.id, self.level, level
            )));
        }
        if !SSTable::is_strictly_sorted(&self.data) {
            return Err(LsmError::InvalidSnapshot(format!(
                "run {} keys are not strictly ascending",
                self.id
            )));
        }
        Ok(SSTable::from_sorted(self.id, level, self.data))
    }
}

impl EngineState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot as JSON to `path`
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a JSON snapshot from `path`
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Total runs across all levels
    pub fn run_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }
}
