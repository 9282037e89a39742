//! Reelcut Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

use super::{HighlightId, TimeSec};

/// A single offending entry from a rejected bulk highlight import.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchIssue {
    /// Zero-based index of the entry in the submitted batch
    pub index: usize,
    /// What was wrong with it
    pub detail: String,
}

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid time range {start:.3}~{end:.3}s (duration bound {bound:.3}s)")]
    InvalidRange {
        start: TimeSec,
        end: TimeSec,
        bound: TimeSec,
    },

    #[error("highlight label is empty")]
    EmptyLabel,

    #[error("highlight not found: {0}")]
    NotFound(HighlightId),

    #[error("highlight import rejected: {} invalid entries", .0.len())]
    BatchValidation(Vec<BatchIssue>),

    #[error("no video imported")]
    NoVideo,

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("export failed for {id}: {reason}")]
    ExportFailed { id: HighlightId, reason: String },
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Stable machine-readable kind, for adapters mapping errors onto HTTP
    /// status codes or CLI exit codes.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::InvalidRange { .. } => "invalid_range",
            CoreError::EmptyLabel => "empty_label",
            CoreError::NotFound(_) => "not_found",
            CoreError::BatchValidation(_) => "batch_validation",
            CoreError::NoVideo => "no_video",
            CoreError::Persistence(_) => "persistence",
            CoreError::ExportFailed { .. } => "export_failed",
        }
    }
}

// IO and JSON failures only ever surface from the persistence layer; fold
// them into the persistence kind so adapters see the full taxonomy in one
// enum.
impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Persistence(err.to_string())
    }
}
