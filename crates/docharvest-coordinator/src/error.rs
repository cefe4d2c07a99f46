//! Error types for coordinator operations

use docharvest_domain::SourceId;
use docharvest_source::SourceError;
use thiserror::Error;

/// Errors that can occur while coordinating scans
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// No stored source under this key
    #[error("Source not found: {0}")]
    SourceNotFound(SourceId),

    /// Resolution, validation or scan of a source failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Scan did not finish in time; the watermark is unchanged
    #[error("Scan of source {source_id} timed out after {secs}s")]
    Timeout {
        /// Source being scanned
        source_id: SourceId,
        /// Configured timeout
        secs: u64,
    },

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl CoordinatorError {
    pub(crate) fn store(e: impl std::fmt::Display) -> Self {
        CoordinatorError::Store(e.to_string())
    }
}
