//! Identity backend trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use login_model::{
    AuthRequest, AuthenticationMethodType, IdentityProvider, IdpLink, LoginPolicy, Organization,
    Session, UserAccount,
};

use crate::error::BackendResult;

/// Filter for user lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    /// Login name to match.
    pub login_name: String,
    /// Restrict matches to an organization.
    pub organization_id: Option<String>,
}

impl UserQuery {
    /// Creates a query matching a login name in any organization.
    #[must_use]
    pub fn by_login_name(login_name: impl Into<String>) -> Self {
        Self {
            login_name: login_name.into(),
            organization_id: None,
        }
    }

    /// Restricts the query to an organization.
    #[must_use]
    pub fn in_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }
}

/// How a session check identifies its user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSearchKey {
    /// By login name.
    LoginName(String),
    /// By user id.
    UserId(String),
}

/// Checks to perform when creating or updating a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionChecks {
    /// The user to bind the session to.
    pub user: UserSearchKey,
    /// Password to verify, if the check includes one.
    pub password: Option<String>,
}

impl SessionChecks {
    /// Creates checks that only bind the user, verifying nothing.
    #[must_use]
    pub const fn for_user(user: UserSearchKey) -> Self {
        Self {
            user,
            password: None,
        }
    }

    /// Adds a password check.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// A freshly created session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    /// Session id.
    pub id: String,
    /// Bearer token for subsequent reads and updates.
    pub token: String,
}

/// The result of updating a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPatch {
    /// Rotated bearer token.
    pub token: String,
    /// New change timestamp.
    pub change_date: DateTime<Utc>,
}

/// A session bound to an authorization request at callback time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBinding {
    /// Session id.
    pub session_id: String,
    /// Session bearer token.
    pub session_token: String,
}

/// The remote identity backend.
///
/// Every method is a single network operation that may fail
/// independently; callers treat each failure as aborting only the branch
/// that issued it.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Lists user accounts matching the query.
    async fn list_users(&self, query: &UserQuery) -> BackendResult<Vec<UserAccount>>;

    /// Fetches a user account by id.
    async fn get_user_by_id(&self, user_id: &str) -> BackendResult<UserAccount>;

    /// Creates a session from the given checks.
    async fn create_session(&self, checks: &SessionChecks) -> BackendResult<CreatedSession>;

    /// Runs further checks against an existing session.
    async fn set_session(
        &self,
        session_id: &str,
        token: &str,
        checks: &SessionChecks,
    ) -> BackendResult<SessionPatch>;

    /// Fetches a session.
    async fn get_session(&self, session_id: &str, token: &str) -> BackendResult<Session>;

    /// Deletes a session (logout).
    async fn delete_session(&self, session_id: &str, token: &str) -> BackendResult<()>;

    /// Fetches the sessions with the given ids. Unknown ids are skipped,
    /// not errors; a browser may hold records for sessions the backend
    /// already dropped.
    async fn list_sessions(&self, ids: &[String]) -> BackendResult<Vec<Session>>;

    /// Lists the authentication methods enrolled for a user.
    async fn list_authentication_methods(
        &self,
        user_id: &str,
    ) -> BackendResult<Vec<AuthenticationMethodType>>;

    /// Fetches the effective login policy for an organization, or the
    /// instance default when no organization is given.
    async fn get_login_policy(&self, organization_id: Option<&str>) -> BackendResult<LoginPolicy>;

    /// Lists organizations whose primary domain equals `domain`.
    async fn get_orgs_by_domain(&self, domain: &str) -> BackendResult<Vec<Organization>>;

    /// Fetches the instance's default organization.
    async fn get_default_organization(&self) -> BackendResult<Organization>;

    /// Lists the active identity providers for an organization, or the
    /// instance-wide providers when no organization is given.
    async fn list_active_idps(
        &self,
        organization_id: Option<&str>,
    ) -> BackendResult<Vec<IdentityProvider>>;

    /// Lists a user's links to external identity providers.
    async fn list_idp_links(&self, user_id: &str) -> BackendResult<Vec<IdpLink>>;

    /// Fetches an identity provider by id.
    async fn get_idp_by_id(&self, idp_id: &str) -> BackendResult<IdentityProvider>;

    /// Starts a federated login and returns the provider's authorization
    /// URL to redirect the user to.
    async fn start_idp_flow(
        &self,
        idp_id: &str,
        success_url: &str,
        failure_url: &str,
    ) -> BackendResult<String>;

    /// Fetches a pending authorization request (OIDC or SAML).
    async fn get_auth_request(&self, request_id: &str) -> BackendResult<AuthRequest>;

    /// Binds a session to an authorization request and returns the
    /// protocol callback URL.
    ///
    /// ## Errors
    ///
    /// Returns [`BackendError::FailedPrecondition`] if the request was
    /// already finalized.
    ///
    /// [`BackendError::FailedPrecondition`]: crate::BackendError::FailedPrecondition
    async fn create_callback(
        &self,
        request_id: &str,
        binding: &SessionBinding,
    ) -> BackendResult<String>;
}
