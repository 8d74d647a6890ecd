//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    /// The edit payload itself is malformed. Stale or unmatched addresses
    /// are never errors; they are skipped with a warning.
    #[error("Invalid edit payload: {0}")]
    InvalidPayload(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
