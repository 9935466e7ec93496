//! Error types shared across the medkb-core crate.
//!
//! Failure scopes are deliberately narrow: extraction errors cover one
//! document, embedding errors cover one batch or one query, and index errors
//! demote the engine to keyword-only retrieval. Steady-state retrieval never
//! surfaces an error to its caller.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MedkbError>;

#[derive(Debug, Error)]
pub enum MedkbError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("index encode error: {0}")]
    IndexEncode(#[from] bincode::error::EncodeError),

    #[error("index decode error: {0}")]
    IndexDecode(#[from] bincode::error::DecodeError),

    #[error("embedding service error: {reason}")]
    EmbeddingService { reason: String },

    #[error("embedding dimension mismatch: index has {expected}, provider returned {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector index unavailable: {reason}")]
    IndexUnavailable { reason: String },

    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("extraction failed for {uri}: {reason}")]
    Extraction { uri: String, reason: String },
}
