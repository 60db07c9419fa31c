//! Operation metrics
//!
//! Counters accumulate for the lifetime of an engine and are zeroed by
//! `Engine::reset`. Amplification ratios are derived on demand.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metrics {
    /// Successful puts and deletes
    pub logical_writes: u64,
    /// Entries written into runs by flushes and compactions
    #[serde(rename = "itemsWrittenToSSTables")]
    pub items_written_to_sstables: u64,
    /// Calls to `get` with a valid key
    pub logical_reads: u64,
    /// Runs probed by reads
    #[serde(rename = "sstablesAccessedForRead")]
    pub sstables_accessed_for_read: u64,
    pub memtable_lookups_for_read: u64,
}

impl Metrics {
    /// Entries written to runs per logical write
    pub fn write_amplification(&self) -> f64 {
        ratio(self.items_written_to_sstables, self.logical_writes)
    }

    /// Runs probed per logical read
    pub fn read_amplification(&self) -> f64 {
        ratio(self.sstables_accessed_for_read, self.logical_reads)
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
