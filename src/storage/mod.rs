//! Storage Module
//!
//! Leveled storage of immutable sorted runs.
//!
//! ## Responsibilities
//! - Hold sorted runs per level
//! - Point lookups across levels, newest data first
//! - Leveled compaction with recency-based duplicate resolution
//!
//! ## Layout
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Level 0   append order, may overlap    │
//! │ ┌──────┐ ┌──────┐ ┌──────┐             │
//! │ │ run1 │ │ run2 │ │ run3 │  (newest →) │
//! │ └──────┘ └──────┘ └──────┘             │
//! ├────────────────────────────────────────┤
//! │ Level 1   sorted by min key            │
//! │ ┌──────┐ ┌──────┐                      │
//! │ │ a..f │ │ g..m │                      │
//! │ └──────┘ └──────┘                      │
//! ├────────────────────────────────────────┤
//! │ ...                                    │
//! └────────────────────────────────────────┘
//! ```

mod compaction;
mod manager;
mod sstable;

pub use compaction::CompactionSummary;
pub use manager::StorageManager;
pub use sstable::{RunId, SSTable};
