//! Activity log
//!
//! Bounded, most-recent-first list of timestamped event messages. Purely
//! observational: no algorithm reads it.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One logged event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
}

impl ActivityLog {
    /// Max entries retained; older entries fall off the end
    pub const CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from entries ordered newest first
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        let mut entries: VecDeque<LogEntry> = entries.into();
        entries.truncate(Self::CAPACITY);
        Self { entries }
    }

    /// Record a message stamped with the current time
    pub fn record(&mut self, message: impl Into<String>) {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.entries.push_front(LogEntry {
            timestamp_ms,
            message: message.into(),
        });
        self.entries.truncate(Self::CAPACITY);
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
