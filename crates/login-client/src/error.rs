//! Backend error types.

use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised by the identity backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation's precondition no longer holds, e.g. the
    /// authorization request was already finalized.
    #[error("precondition failed: {0}")]
    FailedPrecondition(String),

    /// The caller is not allowed to perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The backend could not be reached or answered with a server error.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a payload the client cannot interpret.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Checks whether this error means the entity does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Checks whether this error means a precondition no longer holds.
    #[must_use]
    pub const fn is_failed_precondition(&self) -> bool {
        matches!(self, Self::FailedPrecondition(_))
    }
}
