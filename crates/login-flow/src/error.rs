//! Flow error taxonomy.
//!
//! Authentication feedback stays generic where it could otherwise be
//! used to probe for accounts; the enumeration-sensitive outcomes are
//! handled by routing (see the login-name engine), not by error text.

use login_client::BackendError;
use login_store::StoreError;
use thiserror::Error;

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors produced while resolving an authentication flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// No account matched the identifier. Recoverable; routes to a
    /// fallback page where policy allows.
    #[error("user not found")]
    UserNotFound,

    /// More than one account matched the identifier. Surfaced to the
    /// user; the flow never silently picks one.
    #[error("multiple accounts match this login name")]
    AmbiguousUser,

    /// The account exists but cannot complete a login, e.g. setup was
    /// never finished.
    #[error("account is not ready for login")]
    UnsupportedState,

    /// The tenant's login policy forbids the required method.
    #[error("{0}")]
    PolicyDenied(String),

    /// Silent prompt mode with no usable session. Hard failure; no
    /// interactive fallback is permitted.
    #[error("no active session found")]
    NoActiveSession,

    /// The cookie store has no record for the referenced session.
    #[error("no session record found")]
    SessionNotFound,

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<StoreError> for FlowError {
    fn from(_: StoreError) -> Self {
        Self::SessionNotFound
    }
}

impl FlowError {
    /// Creates a policy-denied error.
    #[must_use]
    pub fn policy_denied(message: impl Into<String>) -> Self {
        Self::PolicyDenied(message.into())
    }
}
