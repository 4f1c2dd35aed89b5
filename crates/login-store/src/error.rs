//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the session cookie store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record matched the lookup.
    #[error("no session record found")]
    NotFound,

    /// The record could not be decoded from the cookie payload.
    #[error("malformed session record: {0}")]
    Malformed(String),
}
