//! Read results and probe traces
//!
//! `Engine::get` always returns a `Lookup`: the outcome plus the ordered list
//! of components it probed. The path is purely observational.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::memtable::MemTableEntry;
use crate::storage::RunId;

/// Outcome of a point lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum LookupValue {
    /// Live value found
    Found(String),
    /// The newest record for the key is a tombstone
    Deleted,
    /// No component holds the key
    Absent,
}

impl LookupValue {
    pub fn value(&self) -> Option<&str> {
        match self {
            LookupValue::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, LookupValue::Deleted)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, LookupValue::Absent)
    }
}

impl From<&MemTableEntry> for LookupValue {
    fn from(entry: &MemTableEntry) -> Self {
        match entry {
            MemTableEntry::Value(v) => LookupValue::Found(v.clone()),
            MemTableEntry::Tombstone => LookupValue::Deleted,
        }
    }
}

/// A component visited by a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Component {
    MemTable,
    Level { level: usize },
    Run { level: usize, id: RunId },
}

/// What happened at one probe step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProbeOutcome {
    Checking,
    Found,
    FoundTombstone,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStep {
    pub component: Component,
    pub outcome: ProbeOutcome,
}

impl ProbeStep {
    pub fn new(component: Component, outcome: ProbeOutcome) -> Self {
        Self { component, outcome }
    }

    /// Step recording the result of probing a component that held `entry`
    pub(crate) fn hit(component: Component, entry: &MemTableEntry) -> Self {
        let outcome = if entry.is_tombstone() {
            ProbeOutcome::FoundTombstone
        } else {
            ProbeOutcome::Found
        };
        Self::new(component, outcome)
    }
}

impl fmt::Display for ProbeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component {
            Component::MemTable => write!(f, "memtable")?,
            Component::Level { level } => write!(f, "L{}", level)?,
            Component::Run { level, id } => write!(f, "L{} {}", level, id)?,
        }
        let outcome = match self.outcome {
            ProbeOutcome::Checking => "checking",
            ProbeOutcome::Found => "found",
            ProbeOutcome::FoundTombstone => "found tombstone",
            ProbeOutcome::NotFound => "not found",
        };
        write!(f, ": {}", outcome)
    }
}

/// Result of `Engine::get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    pub value: LookupValue,
    pub path: Vec<ProbeStep>,
}

impl Lookup {
    pub fn absent(path: Vec<ProbeStep>) -> Self {
        Self {
            value: LookupValue::Absent,
            path,
        }
    }
}

/// Probe path and access count accumulated while reading the levels
#[derive(Debug, Default)]
pub(crate) struct ReadTrace {
    pub path: Vec<ProbeStep>,
    pub runs_accessed: u64,
}
