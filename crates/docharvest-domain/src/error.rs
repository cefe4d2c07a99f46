//! Errors crossing the remote API boundary

use thiserror::Error;

/// Failure to read from the remote annotation service
///
/// Never retried by the core; retry policy belongs to the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network, DNS, timeout or other transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code returned by the remote API
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The remote API answered but had no such document
    #[error("Not found: {0}")]
    NotFound(String),
}
