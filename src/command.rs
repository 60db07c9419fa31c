//! Command definitions
//!
//! Text commands driving an engine, one per line:
//!
//! ```text
//! put <key> <value>      value may contain spaces
//! del <key>
//! get <key>
//! flush
//! compact <level>
//! state
//! metrics
//! reset [field=value ...]
//! ```
//!
//! `reset` fields use the snapshot names (`memtableMaxSize`,
//! `l0MaxSSTables`, `levelMaxSSTablesFactor`, `sstableMaxItems`,
//! `maxLevels`); fields not given take their defaults.

use std::fmt;

use crate::config::Config;
use crate::error::{LsmError, Result};
use crate::lookup::{Lookup, LookupValue};
use crate::metrics::Metrics;
use crate::state::EngineState;
use crate::storage::{CompactionSummary, RunId};

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Put a key-value pair
    Put { key: String, value: String },

    /// Delete a key
    Delete { key: String },

    /// Get a value by key
    Get { key: String },

    /// Force a memtable flush
    Flush,

    /// Compact one level into the next
    Compact { level: usize },

    /// Dump the full engine state
    State,

    /// Show metrics and amplification ratios
    Metrics,

    /// Discard everything and start over with a new config
    Reset { config: Config },
}

impl Command {
    /// Parse one command line
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "put" | "set" => {
                let (key, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| LsmError::Command("usage: put <key> <value>".into()))?;
                Ok(Command::Put {
                    key: key.to_string(),
                    value: value.trim_start().to_string(),
                })
            }
            "del" | "delete" => Ok(Command::Delete {
                key: single_arg(rest, "del <key>")?,
            }),
            "get" => Ok(Command::Get {
                key: single_arg(rest, "get <key>")?,
            }),
            "flush" => Ok(Command::Flush),
            "compact" => {
                let level = single_arg(rest, "compact <level>")?;
                let level = level
                    .parse()
                    .map_err(|_| LsmError::Command(format!("invalid level: {}", level)))?;
                Ok(Command::Compact { level })
            }
            "state" => Ok(Command::State),
            "metrics" => Ok(Command::Metrics),
            "reset" => Ok(Command::Reset {
                config: parse_config(rest)?,
            }),
            "" => Err(LsmError::Command("empty command".into())),
            other => Err(LsmError::Command(format!("unknown command: {}", other))),
        }
    }
}

fn single_arg(rest: &str, usage: &str) -> Result<String> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(arg), None) => Ok(arg.to_string()),
        _ => Err(LsmError::Command(format!("usage: {}", usage))),
    }
}

/// Parse `field=value` pairs on top of the default config
fn parse_config(rest: &str) -> Result<Config> {
    let mut config = Config::default();
    for pair in rest.split_whitespace() {
        let (field, value) = pair
            .split_once('=')
            .ok_or_else(|| LsmError::Command(format!("expected field=value, got {}", pair)))?;
        let value: usize = value
            .parse()
            .map_err(|_| LsmError::Command(format!("invalid value for {}: {}", field, value)))?;
        match field {
            "memtableMaxSize" => config.memtable_max_size = value,
            "l0MaxSSTables" => config.l0_max_sstables = value,
            "levelMaxSSTablesFactor" => config.level_max_sstables_factor = value,
            "sstableMaxItems" => config.sstable_max_items = value,
            "maxLevels" => config.max_levels = value,
            other => return Err(LsmError::Command(format!("unknown config field: {}", other))),
        }
    }
    Ok(config.normalized())
}

/// Result of an executed command
#[derive(Debug, Clone)]
pub enum Response {
    Ok(String),
    Lookup(Lookup),
    Flushed(Option<RunId>),
    Compacted(Option<CompactionSummary>),
    State(Box<EngineState>),
    Metrics(Metrics),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok(message) => write!(f, "OK {}", message),
            Response::Lookup(lookup) => {
                match &lookup.value {
                    LookupValue::Found(v) => writeln!(f, "{}", v)?,
                    LookupValue::Deleted => writeln!(f, "(deleted)")?,
                    LookupValue::Absent => writeln!(f, "(not found)")?,
                }
                for step in &lookup.path {
                    writeln!(f, "  {}", step)?;
                }
                Ok(())
            }
            Response::Flushed(Some(id)) => write!(f, "OK flushed to {}", id),
            Response::Flushed(None) => write!(f, "OK nothing to flush"),
            Response::Compacted(Some(s)) => write!(
                f,
                "OK L{} → L{}: {} runs in, {} runs out, {} items written",
                s.source_level,
                s.target_level,
                s.source_runs.len() + s.target_runs.len(),
                s.output_runs.len(),
                s.items_written
            ),
            Response::Compacted(None) => write!(f, "OK nothing to compact"),
            Response::State(state) => {
                let json = serde_json::to_string_pretty(state).map_err(|_| fmt::Error)?;
                write!(f, "{}", json)
            }
            Response::Metrics(m) => write!(
                f,
                "writes={} reads={} items_written={} sstables_read={} memtable_reads={} write_amp={:.2} read_amp={:.2}",
                m.logical_writes,
                m.logical_reads,
                m.items_written_to_sstables,
                m.sstables_accessed_for_read,
                m.memtable_lookups_for_read,
                m.write_amplification(),
                m.read_amplification()
            ),
        }
    }
}
