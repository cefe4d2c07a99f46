//! Error types for tracked source operations

use docharvest_domain::FetchError;
use thiserror::Error;

/// Errors that can occur while resolving, validating or scanning a source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Resolver input was not a string
    #[error("Invalid input: expected a string, got {0}")]
    InvalidInput(String),

    /// No document id could be extracted from the input
    #[error("Unable to guess a document id from input {input:?}")]
    Unresolvable {
        /// The offending input
        input: String,
    },

    /// The remote API could not be read
    #[error("Remote fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The source cannot currently reach its discussions
    #[error("Unable to read discussions of document {document_id}: {cause}")]
    Validation {
        /// Remote document id
        document_id: String,
        /// Underlying fetch failure
        cause: FetchError,
    },

    /// Identifier belongs to a different adapter
    #[error("Adapter mismatch: source belongs to {found:?}, expected {expected:?}")]
    AdapterMismatch {
        /// Id of the adapter building the source
        expected: String,
        /// Adapter id found in the identifier
        found: String,
    },

    /// Identifier has no document id
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),
}

impl SourceError {
    /// HTTP-style status for reporting to a client
    ///
    /// Bad input and unreachable discussions are the caller's problem (400);
    /// remote failures are a bad gateway (502); invariant violations are
    /// internal errors (500).
    pub fn status_code(&self) -> u16 {
        match self {
            SourceError::InvalidInput(_)
            | SourceError::Unresolvable { .. }
            | SourceError::Validation { .. } => 400,
            SourceError::Fetch(_) => 502,
            SourceError::AdapterMismatch { .. } | SourceError::MalformedIdentifier(_) => 500,
        }
    }
}
