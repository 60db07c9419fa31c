//! Error types for lsmsim
//!
//! Provides a unified error type for all operations. No error is fatal to an
//! engine instance: every failure leaves the engine in its previous state.

use thiserror::Error;

/// Result type alias using LsmError
pub type Result<T> = std::result::Result<T, LsmError>;

/// Unified error type for lsmsim operations
#[derive(Debug, Error)]
pub enum LsmError {
    // -------------------------------------------------------------------------
    // Operation Errors
    // -------------------------------------------------------------------------
    /// Empty key, out-of-range level, or similar caller mistake
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The write buffer stayed full after a flush attempt
    #[error("Write rejected: {0}")]
    WriteRejected(String),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Command error: {0}")]
    Command(String),
}

impl From<serde_json::Error> for LsmError {
    fn from(e: serde_json::Error) -> Self {
        LsmError::Serialization(e.to_string())
    }
}
