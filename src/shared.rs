//! Shared engine handle
//!
//! The engine mutates its buffer, levels, metrics and log in multi-step
//! sequences, so sharing puts the whole instance behind one mutex. Every
//! call holds the lock for its full duration, compaction cascade included.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::{Command, Response};
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::lookup::Lookup;
use crate::state::EngineState;
use crate::storage::{CompactionSummary, RunId};

/// Cloneable handle to one engine instance
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(config: Config) -> Self {
        Self::from_engine(Engine::new(config))
    }

    pub fn from_engine(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.inner.lock().put(key, value)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.inner.lock().delete(key)
    }

    pub fn get(&self, key: &str) -> Lookup {
        self.inner.lock().get(key)
    }

    pub fn flush(&self) -> Option<RunId> {
        self.inner.lock().flush()
    }

    pub fn compact(&self, level: usize) -> Result<Option<CompactionSummary>> {
        self.inner.lock().compact(level)
    }

    pub fn reset(&self, config: Config) {
        self.inner.lock().reset(config)
    }

    pub fn state(&self) -> EngineState {
        self.inner.lock().state()
    }

    pub fn execute(&self, command: Command) -> Result<Response> {
        self.inner.lock().execute(command)
    }

    /// Run several operations under one lock acquisition
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
