//! Configuration for lsmsim
//!
//! Centralized configuration with sensible defaults. A config is immutable for
//! the lifetime of an engine; structural changes go through `Engine::reset`.

use serde::{Deserialize, Serialize};

/// Main configuration for an LSM engine instance
///
/// Serialized with camelCase field names so snapshots stay compatible with
/// the rendering layer (`memtableMaxSize`, `l0MaxSSTables`, ...). Missing
/// fields deserialize to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Write Buffer Configuration
    // -------------------------------------------------------------------------
    /// Max distinct keys in the memtable before it is flushed
    #[serde(rename = "memtableMaxSize")]
    pub memtable_max_size: usize,

    // -------------------------------------------------------------------------
    // Level Configuration
    // -------------------------------------------------------------------------
    /// Max runs in level 0 before it is compacted
    #[serde(rename = "l0MaxSSTables")]
    pub l0_max_sstables: usize,

    /// Growth factor of run capacity per level below level 0
    #[serde(rename = "levelMaxSSTablesFactor")]
    pub level_max_sstables_factor: usize,

    /// Max entries per run produced by compaction
    #[serde(rename = "sstableMaxItems")]
    pub sstable_max_items: usize,

    /// Number of levels, including level 0
    #[serde(rename = "maxLevels")]
    pub max_levels: usize,
}

impl Config {
    pub const DEFAULT_MEMTABLE_MAX_SIZE: usize = 5;
    pub const DEFAULT_L0_MAX_SSTABLES: usize = 3;
    pub const DEFAULT_LEVEL_MAX_SSTABLES_FACTOR: usize = 4;
    pub const DEFAULT_SSTABLE_MAX_ITEMS: usize = 10;
    pub const DEFAULT_MAX_LEVELS: usize = 5;

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Replace every zero (unset) field with its default
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let pick = |name: &str, value: usize, default: usize| {
            if value == 0 {
                tracing::warn!("config field {} is unset, using default {}", name, default);
                default
            } else {
                value
            }
        };

        Self {
            memtable_max_size: pick(
                "memtableMaxSize",
                self.memtable_max_size,
                defaults.memtable_max_size,
            ),
            l0_max_sstables: pick(
                "l0MaxSSTables",
                self.l0_max_sstables,
                defaults.l0_max_sstables,
            ),
            level_max_sstables_factor: pick(
                "levelMaxSSTablesFactor",
                self.level_max_sstables_factor,
                defaults.level_max_sstables_factor,
            ),
            sstable_max_items: pick(
                "sstableMaxItems",
                self.sstable_max_items,
                defaults.sstable_max_items,
            ),
            max_levels: pick("maxLevels", self.max_levels, defaults.max_levels),
        }
    }

    /// Max number of runs `level` may hold before it is compacted
    ///
    /// Level 0 holds `l0_max_sstables`; level `i >= 1` holds
    /// `l0_max_sstables * factor^i`.
    pub fn level_capacity(&self, level: usize) -> usize {
        if level == 0 {
            return self.l0_max_sstables;
        }
        let exponent = u32::try_from(level).unwrap_or(u32::MAX);
        self.l0_max_sstables
            .saturating_mul(self.level_max_sstables_factor.saturating_pow(exponent))
    }

    /// Index of the deepest level
    pub fn last_level(&self) -> usize {
        self.max_levels.saturating_sub(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memtable_max_size: Self::DEFAULT_MEMTABLE_MAX_SIZE,
            l0_max_sstables: Self::DEFAULT_L0_MAX_SSTABLES,
            level_max_sstables_factor: Self::DEFAULT_LEVEL_MAX_SSTABLES_FACTOR,
            sstable_max_items: Self::DEFAULT_SSTABLE_MAX_ITEMS,
            max_levels: Self::DEFAULT_MAX_LEVELS,
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the memtable capacity (distinct keys)
    pub fn memtable_max_size(mut self, size: usize) -> Self {
        self.config.memtable_max_size = size;
        self
    }

    /// Set the level 0 run capacity
    pub fn l0_max_sstables(mut self, count: usize) -> Self {
        self.config.l0_max_sstables = count;
        self
    }

    /// Set the per-level capacity growth factor
    pub fn level_max_sstables_factor(mut self, factor: usize) -> Self {
        self.config.level_max_sstables_factor = factor;
        self
    }

    /// Set the max entries per compacted run
    pub fn sstable_max_items(mut self, items: usize) -> Self {
        self.config.sstable_max_items = items;
        self
    }

    /// Set the number of levels
    pub fn max_levels(mut self, levels: usize) -> Self {
        self.config.max_levels = levels;
        self
    }

    pub fn build(self) -> Config {
        self.config.normalized()
    }
}
