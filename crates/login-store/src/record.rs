//! Session cookie record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client-held pointer to a backend session.
///
/// The login name and organization are denormalized so account pickers
/// can render without a backend round-trip. The record is created when
/// the session is created, rewritten on every session mutation, and
/// removed on logout or expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookieRecord {
    /// Backend session id.
    pub id: String,
    /// Bearer token authorizing reads and updates of the session.
    pub token: String,
    /// Login name the session was established with.
    pub login_name: String,
    /// Organization of the session's user.
    pub organization: Option<String>,
    /// When the session was created.
    pub creation_date: DateTime<Utc>,
    /// When the session was last touched.
    pub change_date: DateTime<Utc>,
    /// When the session expires, if it does.
    pub expiration_date: Option<DateTime<Utc>>,
    /// Authorization request this session is completing, if any.
    pub auth_request_id: Option<String>,
}

impl SessionCookieRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        token: impl Into<String>,
        login_name: impl Into<String>,
        creation_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
            login_name: login_name.into(),
            organization: None,
            creation_date,
            change_date: creation_date,
            expiration_date: None,
            auth_request_id: None,
        }
    }

    /// Sets the organization.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Sets the change date.
    #[must_use]
    pub const fn with_change_date(mut self, change_date: DateTime<Utc>) -> Self {
        self.change_date = change_date;
        self
    }

    /// Sets the expiration date.
    #[must_use]
    pub const fn with_expiration(mut self, expiration_date: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration_date);
        self
    }

    /// Links the record to a pending authorization request.
    #[must_use]
    pub fn with_auth_request_id(mut self, auth_request_id: impl Into<String>) -> Self {
        self.auth_request_id = Some(auth_request_id.into());
        self
    }
}
