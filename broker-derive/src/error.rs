//! Error types for broker-derive
//!
//! Only structural problems are errors. Reference lookups that miss are
//! soft: the field is nulled and an event goes to the sink.

use thiserror::Error;

/// Fatal derivation error
#[derive(Debug, Error)]
pub enum DeriveError {
    /// Reference snapshot is missing a required table
    #[error("Reference snapshot is missing required table: {0}")]
    Snapshot(String),

    /// Input object could not be turned into a record
    #[error("Malformed record: {0}")]
    Record(String),

    /// Worker task failed to complete
    #[error("Worker failed: {0}")]
    Worker(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for derivation operations
pub type DeriveResult<T> = Result<T, DeriveError>;
