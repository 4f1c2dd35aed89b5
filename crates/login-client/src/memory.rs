//! In-memory implementation of the identity backend.
//!
//! Holds the full backend state in process. Used by the flow tests and
//! by local demos; it implements the same contract as [`HttpBackend`],
//! including single-use callback finalization.
//!
//! [`HttpBackend`]: crate::HttpBackend

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use login_model::{
    AuthRequest, AuthenticationMethodType, IdentityProvider, IdpLink, LoginPolicy, Organization,
    Session, UserAccount, UserFactor,
};

use crate::backend::{
    CreatedSession, IdentityBackend, SessionBinding, SessionChecks, SessionPatch, UserQuery,
    UserSearchKey,
};
use crate::error::{BackendError, BackendResult};

#[derive(Debug, Clone)]
struct StoredSession {
    session: Session,
    token: String,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<UserAccount>,
    methods: HashMap<String, Vec<AuthenticationMethodType>>,
    default_policy: LoginPolicy,
    org_policies: HashMap<String, LoginPolicy>,
    organizations: Vec<Organization>,
    default_organization: Option<Organization>,
    idps: Vec<IdentityProvider>,
    idp_links: Vec<IdpLink>,
    sessions: HashMap<String, StoredSession>,
    auth_requests: HashMap<String, AuthRequest>,
    finalized: HashSet<String>,
}

/// Identity backend holding all state in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
}

impl MemoryBackend {
    /// Creates an empty backend with a default login policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user account.
    pub fn add_user(&self, user: UserAccount) {
        self.state.write().users.push(user);
    }

    /// Sets the authentication methods enrolled for a user.
    pub fn set_authentication_methods(
        &self,
        user_id: impl Into<String>,
        methods: Vec<AuthenticationMethodType>,
    ) {
        self.state.write().methods.insert(user_id.into(), methods);
    }

    /// Sets the instance default login policy.
    pub fn set_default_policy(&self, policy: LoginPolicy) {
        self.state.write().default_policy = policy;
    }

    /// Sets the login policy for one organization.
    pub fn set_organization_policy(&self, organization_id: impl Into<String>, policy: LoginPolicy) {
        self.state
            .write()
            .org_policies
            .insert(organization_id.into(), policy);
    }

    /// Adds an organization.
    pub fn add_organization(&self, organization: Organization) {
        self.state.write().organizations.push(organization);
    }

    /// Sets the default organization.
    pub fn set_default_organization(&self, organization: Organization) {
        self.state.write().default_organization = Some(organization);
    }

    /// Adds an active identity provider.
    pub fn add_idp(&self, idp: IdentityProvider) {
        self.state.write().idps.push(idp);
    }

    /// Links a user to an identity provider.
    pub fn add_idp_link(&self, link: IdpLink) {
        self.state.write().idp_links.push(link);
    }

    /// Registers a pending authorization request.
    pub fn add_auth_request(&self, request: AuthRequest) {
        self.state
            .write()
            .auth_requests
            .insert(request.id.clone(), request);
    }

    /// Inserts a session with its bearer token, e.g. to model an
    /// already-signed-in browser.
    pub fn insert_session(&self, session: Session, token: impl Into<String>) {
        self.state.write().sessions.insert(
            session.id.clone(),
            StoredSession {
                session,
                token: token.into(),
            },
        );
    }

    /// Checks whether an authorization request has been finalized.
    #[must_use]
    pub fn is_finalized(&self, request_id: &str) -> bool {
        self.state.read().finalized.contains(request_id)
    }

    fn find_user(state: &State, key: &UserSearchKey) -> Option<UserAccount> {
        match key {
            UserSearchKey::UserId(id) => state.users.iter().find(|u| &u.id == id).cloned(),
            UserSearchKey::LoginName(name) => state
                .users
                .iter()
                .find(|u| user_matches_login_name(u, name))
                .cloned(),
        }
    }
}

fn user_matches_login_name(user: &UserAccount, login_name: &str) -> bool {
    user.preferred_login_name == login_name
        || user
            .email
            .as_ref()
            .is_some_and(|e| e.address == login_name)
        || user.phone.as_ref().is_some_and(|p| p.number == login_name)
}

#[async_trait]
impl IdentityBackend for MemoryBackend {
    async fn list_users(&self, query: &UserQuery) -> BackendResult<Vec<UserAccount>> {
        let state = self.state.read();
        Ok(state
            .users
            .iter()
            .filter(|u| user_matches_login_name(u, &query.login_name))
            .filter(|u| match &query.organization_id {
                Some(org) => &u.organization_id == org,
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_user_by_id(&self, user_id: &str) -> BackendResult<UserAccount> {
        self.state
            .read()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| BackendError::not_found(format!("user {user_id}")))
    }

    async fn create_session(&self, checks: &SessionChecks) -> BackendResult<CreatedSession> {
        let mut state = self.state.write();
        let user = Self::find_user(&state, &checks.user)
            .ok_or_else(|| BackendError::not_found("user for session checks"))?;

        let now = Utc::now();
        let mut session = Session::new(Uuid::new_v4().to_string(), now).with_user(UserFactor {
            id: user.id.clone(),
            login_name: user.preferred_login_name.clone(),
            organization_id: user.organization_id.clone(),
            display_name: None,
        });
        if checks.password.is_some() {
            session = session.with_password_check(now);
        }

        let created = CreatedSession {
            id: session.id.clone(),
            token: Uuid::new_v4().to_string(),
        };
        state.sessions.insert(
            created.id.clone(),
            StoredSession {
                session,
                token: created.token.clone(),
            },
        );
        Ok(created)
    }

    async fn set_session(
        &self,
        session_id: &str,
        token: &str,
        checks: &SessionChecks,
    ) -> BackendResult<SessionPatch> {
        let mut state = self.state.write();
        let stored = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| BackendError::not_found(format!("session {session_id}")))?;
        if stored.token != token {
            return Err(BackendError::PermissionDenied("invalid session token".into()));
        }

        let now = Utc::now();
        if checks.password.is_some() {
            stored.session.factors.password = Some(login_model::FactorCheck::at(now));
        }
        stored.session.change_date = now;
        stored.token = Uuid::new_v4().to_string();
        Ok(SessionPatch {
            token: stored.token.clone(),
            change_date: now,
        })
    }

    async fn get_session(&self, session_id: &str, token: &str) -> BackendResult<Session> {
        let state = self.state.read();
        let stored = state
            .sessions
            .get(session_id)
            .ok_or_else(|| BackendError::not_found(format!("session {session_id}")))?;
        if stored.token != token {
            return Err(BackendError::PermissionDenied("invalid session token".into()));
        }
        Ok(stored.session.clone())
    }

    async fn delete_session(&self, session_id: &str, token: &str) -> BackendResult<()> {
        let mut state = self.state.write();
        let stored = state
            .sessions
            .get(session_id)
            .ok_or_else(|| BackendError::not_found(format!("session {session_id}")))?;
        if stored.token != token {
            return Err(BackendError::PermissionDenied("invalid session token".into()));
        }
        state.sessions.remove(session_id);
        Ok(())
    }

    async fn list_sessions(&self, ids: &[String]) -> BackendResult<Vec<Session>> {
        let state = self.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.sessions.get(id).map(|s| s.session.clone()))
            .collect())
    }

    async fn list_authentication_methods(
        &self,
        user_id: &str,
    ) -> BackendResult<Vec<AuthenticationMethodType>> {
        Ok(self
            .state
            .read()
            .methods
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_login_policy(&self, organization_id: Option<&str>) -> BackendResult<LoginPolicy> {
        let state = self.state.read();
        Ok(organization_id
            .and_then(|org| state.org_policies.get(org))
            .unwrap_or(&state.default_policy)
            .clone())
    }

    async fn get_orgs_by_domain(&self, domain: &str) -> BackendResult<Vec<Organization>> {
        Ok(self
            .state
            .read()
            .organizations
            .iter()
            .filter(|o| o.primary_domain.as_deref() == Some(domain))
            .cloned()
            .collect())
    }

    async fn get_default_organization(&self) -> BackendResult<Organization> {
        self.state
            .read()
            .default_organization
            .clone()
            .ok_or_else(|| BackendError::not_found("default organization"))
    }

    async fn list_active_idps(
        &self,
        _organization_id: Option<&str>,
    ) -> BackendResult<Vec<IdentityProvider>> {
        Ok(self.state.read().idps.clone())
    }

    async fn list_idp_links(&self, user_id: &str) -> BackendResult<Vec<IdpLink>> {
        Ok(self
            .state
            .read()
            .idp_links
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_idp_by_id(&self, idp_id: &str) -> BackendResult<IdentityProvider> {
        self.state
            .read()
            .idps
            .iter()
            .find(|i| i.id == idp_id)
            .cloned()
            .ok_or_else(|| BackendError::not_found(format!("identity provider {idp_id}")))
    }

    async fn start_idp_flow(
        &self,
        idp_id: &str,
        success_url: &str,
        _failure_url: &str,
    ) -> BackendResult<String> {
        let state = self.state.read();
        if !state.idps.iter().any(|i| i.id == idp_id) {
            return Err(BackendError::not_found(format!("identity provider {idp_id}")));
        }
        let intent = Uuid::new_v4();
        Ok(format!(
            "https://sso.example.test/authorize?intent={intent}&idp={idp_id}&redirect={success_url}"
        ))
    }

    async fn get_auth_request(&self, request_id: &str) -> BackendResult<AuthRequest> {
        self.state
            .read()
            .auth_requests
            .get(request_id)
            .cloned()
            .ok_or_else(|| BackendError::not_found(format!("authorization request {request_id}")))
    }

    async fn create_callback(
        &self,
        request_id: &str,
        binding: &SessionBinding,
    ) -> BackendResult<String> {
        let mut state = self.state.write();
        if !state.auth_requests.contains_key(request_id) {
            return Err(BackendError::not_found(format!(
                "authorization request {request_id}"
            )));
        }
        if !state.finalized.insert(request_id.to_string()) {
            return Err(BackendError::FailedPrecondition(
                "authorization request already finalized".into(),
            ));
        }
        Ok(format!(
            "https://client.example.test/callback?requestId={request_id}&sessionId={}",
            binding.session_id
        ))
    }
}
