//! # lsmsim
//!
//! An in-memory, leveled Log-Structured Merge tree with:
//! - A bounded write buffer with last-write-wins semantics
//! - Immutable sorted runs organized in levels
//! - Logical deletes via tombstones
//! - Leveled compaction with recency-based duplicate resolution
//! - Read/write amplification metrics and a bounded activity log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Caller / UI / lsmsim CLI                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ put / delete / get / compact / state
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Engine                              │
//! │           (metrics, activity log, snapshots)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐  flush   ┌──────────────────┐
//!   │  MemTable   │ ───────▶ │  StorageManager  │
//!   │  (BTreeMap) │          │ L0 → L1 → ... Ln │
//!   └─────────────┘          └──────────────────┘
//!                              compaction cascade
//! ```
//!
//! Everything is volatile: there is no WAL and no on-disk format. Snapshots
//! (`EngineState`) can be saved to and restored from JSON.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod memtable;
pub mod storage;
pub mod lookup;
pub mod metrics;
pub mod activity;
pub mod state;
pub mod command;
pub mod engine;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LsmError, Result};
pub use config::Config;
pub use engine::Engine;
pub use lookup::{Lookup, LookupValue};
pub use shared::SharedEngine;
pub use state::EngineState;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lsmsim
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
