//! Flow continuation and callback finalization.
//!
//! The entry point of the whole login flow: given a pending
//! authorization request and whatever sessions the browser holds,
//! decide the terminal action. Prompt handling runs in a fixed order
//! (select-account, then login, then none, then the default callback
//! attempt); the order encodes protocol precedence.

use std::sync::Arc;

use login_client::{IdentityBackend, SessionBinding};
use login_model::{AuthRequest, Prompt, Session};
use login_store::{SessionCookieRecord, SessionStore};

use crate::error::{FlowError, FlowResult};
use crate::idp::start_idp_redirect;
use crate::loginname::{LoginNameCommand, LoginNameResolver};
use crate::mfa::check_mfa_factors;
use crate::outcome::{routes, FlowOutcome, RedirectTarget};
use crate::select::select_valid_session;
use crate::validity::is_session_valid;

/// Resolves inbound authorization requests to terminal actions.
pub struct FlowResolver {
    backend: Arc<dyn IdentityBackend>,
    store: Arc<dyn SessionStore>,
    base_url: String,
}

impl FlowResolver {
    /// Creates a resolver.
    ///
    /// `base_url` is this service's externally visible origin, used for
    /// identity provider return URLs.
    pub fn new(
        backend: Arc<dyn IdentityBackend>,
        store: Arc<dyn SessionStore>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            store,
            base_url: base_url.into(),
        }
    }

    fn loginname(&self) -> LoginNameResolver<'_> {
        LoginNameResolver::new(&*self.backend, &*self.store, &self.base_url)
    }

    /// Resolves a submitted login name; see [`LoginNameResolver`].
    ///
    /// ## Errors
    ///
    /// See [`LoginNameResolver::resolve`].
    pub async fn send_login_name(&self, command: &LoginNameCommand) -> FlowResult<FlowOutcome> {
        self.loginname().resolve(command).await
    }

    /// Resolves an inbound authorization request.
    ///
    /// With a `session_id` the caller is asking to finalize with that
    /// specific session (e.g. after the account picker). Without one,
    /// the request's scopes and prompts decide between an identity
    /// provider redirect, registration, account selection, login-name
    /// collection, silent completion, or the default callback attempt.
    ///
    /// ## Errors
    ///
    /// - [`FlowError::NoActiveSession`] under a `none` prompt with no
    ///   valid session.
    /// - [`FlowError::SessionNotFound`] when a requested session is not
    ///   in the browser's records.
    /// - [`FlowError::Backend`] for remote failures.
    pub async fn resolve(
        &self,
        request_id: &str,
        session_id: Option<&str>,
    ) -> FlowResult<FlowOutcome> {
        let records = self.store.all();
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let sessions = if ids.is_empty() {
            Vec::new()
        } else {
            self.backend.list_sessions(&ids).await?
        };

        if let Some(session_id) = session_id {
            return self.finalize_with_session(request_id, session_id, &sessions).await;
        }

        let auth_request = self.backend.get_auth_request(request_id).await?;

        let hints = auth_request.scope_hints();
        let mut organization = hints.organization_id.clone();
        let mut suffix = None;
        if organization.is_none() {
            if let Some(domain) = &hints.organization_domain {
                let organizations = self.backend.get_orgs_by_domain(domain).await?;
                if let [org] = organizations.as_slice() {
                    organization = Some(org.id.clone());
                    suffix = Some(domain.clone());
                }
            }
        }

        if let Some(idp_id) = &hints.idp_id {
            let idps = self
                .backend
                .list_active_idps(organization.as_deref())
                .await?;
            if let Some(idp) = idps.iter().find(|i| &i.id == idp_id) {
                return start_idp_redirect(
                    &*self.backend,
                    &self.base_url,
                    idp,
                    Some(request_id),
                    organization.as_deref(),
                )
                .await;
            }
        }

        if auth_request.has_prompt(Prompt::Create) {
            return Ok(RedirectTarget::new(routes::REGISTER)
                .param("requestId", request_id)
                .param_opt("organization", organization)
                .into_outcome());
        }

        if sessions.is_empty() {
            let mut target = RedirectTarget::new(routes::LOGIN_NAME).param("requestId", request_id);
            if let Some(hint) = &auth_request.login_hint {
                target = target.param("loginName", hint).param("submit", "true");
            }
            return Ok(target.param_opt("organization", organization).into_outcome());
        }

        if auth_request.has_prompt(Prompt::SelectAccount) {
            return Ok(accounts_redirect(request_id, organization.as_deref()));
        }

        if auth_request.has_prompt(Prompt::Login) {
            // Re-authentication was requested; a login hint skips the
            // login-name page and enters resolution directly.
            if let Some(hint) = &auth_request.login_hint {
                let mut command =
                    LoginNameCommand::new(hint.clone()).with_auth_request_id(request_id);
                if let Some(org) = &organization {
                    command = command.with_organization(org.clone());
                }
                match self.loginname().resolve(&command).await {
                    Ok(outcome @ FlowOutcome::Redirect(_)) => return Ok(outcome),
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "login hint resolution failed");
                    }
                }
            }
            return Ok(RedirectTarget::new(routes::LOGIN_NAME)
                .param("requestId", request_id)
                .param_opt("loginName", auth_request.login_hint.clone())
                .param_opt("organization", organization)
                .param_opt("suffix", suffix)
                .into_outcome());
        }

        if auth_request.has_prompt(Prompt::None) {
            return self.silent_callback(request_id, &auth_request, &sessions).await;
        }

        // No prompt constraint: bind the best valid session, or hand the
        // user to the account picker.
        let Some(selected) = select_valid_session(&*self.backend, &sessions, &auth_request).await?
        else {
            return Ok(accounts_redirect(request_id, organization.as_deref()));
        };
        let Ok(record) = self.store.get(&selected.id) else {
            return Ok(accounts_redirect(request_id, organization.as_deref()));
        };
        self.finalize_callback(request_id, &record).await
    }

    /// Completes a silent (`prompt=none`) request. No interactive
    /// fallback is permitted; anything short of a valid session is a
    /// hard failure.
    async fn silent_callback(
        &self,
        request_id: &str,
        auth_request: &AuthRequest,
        sessions: &[Session],
    ) -> FlowResult<FlowOutcome> {
        let Some(selected) = select_valid_session(&*self.backend, sessions, auth_request).await?
        else {
            return Err(FlowError::NoActiveSession);
        };
        let Ok(record) = self.store.get(&selected.id) else {
            return Err(FlowError::NoActiveSession);
        };

        let binding = SessionBinding {
            session_id: record.id.clone(),
            session_token: record.token.clone(),
        };
        let url = self.backend.create_callback(request_id, &binding).await?;
        Ok(FlowOutcome::Redirect(url))
    }

    /// Finalizes with an explicitly chosen session. A session that is no
    /// longer valid re-enters login-name resolution with its own login
    /// name, so the user re-authenticates into the same account.
    async fn finalize_with_session(
        &self,
        request_id: &str,
        session_id: &str,
        sessions: &[Session],
    ) -> FlowResult<FlowOutcome> {
        let Some(selected) = sessions.iter().find(|s| s.id == session_id) else {
            return Err(FlowError::SessionNotFound);
        };

        if !is_session_valid(&*self.backend, selected).await? {
            if let Some(user) = selected.user() {
                let command = LoginNameCommand::new(user.login_name.clone())
                    .with_organization(user.organization_id.clone())
                    .with_auth_request_id(request_id);
                return self.loginname().resolve(&command).await;
            }
        }

        let record = self.store.get(session_id)?;
        self.finalize_callback(request_id, &record).await
    }

    /// Binds the session to the authorization request and redirects to
    /// the protocol callback.
    ///
    /// An already-finalized request (a stale link reusing an old request
    /// id) is downgraded to the policy's default redirect URI, or the
    /// generic signed-in page. Every other backend error propagates.
    async fn finalize_callback(
        &self,
        request_id: &str,
        record: &SessionCookieRecord,
    ) -> FlowResult<FlowOutcome> {
        let binding = SessionBinding {
            session_id: record.id.clone(),
            session_token: record.token.clone(),
        };
        match self.backend.create_callback(request_id, &binding).await {
            Ok(url) => Ok(FlowOutcome::Redirect(url)),
            Err(err) if err.is_failed_precondition() => {
                tracing::warn!(request_id, "authorization request already finalized");
                let policy = self
                    .backend
                    .get_login_policy(record.organization.as_deref())
                    .await?;
                if let Some(uri) = policy.default_redirect_uri {
                    return Ok(FlowOutcome::Redirect(uri));
                }
                Ok(RedirectTarget::new(routes::SIGNED_IN)
                    .param("loginName", &record.login_name)
                    .param_opt("organization", record.organization.clone())
                    .into_outcome())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Decides what follows a successful credential check: a forced
    /// password change, a further factor, the protocol callback, or
    /// nothing.
    ///
    /// ## Errors
    ///
    /// Propagates backend failures; [`FlowError::SessionNotFound`] when
    /// finalization is requested but the browser holds no record for
    /// the session.
    pub async fn continue_after_check(
        &self,
        session: &Session,
        organization: Option<&str>,
        request_id: Option<&str>,
    ) -> FlowResult<FlowOutcome> {
        let Some(user) = session.user() else {
            return Err(FlowError::NoActiveSession);
        };

        let account = self.backend.get_user_by_id(&user.id).await?;
        if account.password_change_required {
            return Ok(RedirectTarget::new(routes::PASSWORD_CHANGE)
                .param("loginName", &user.login_name)
                .param("organization", organization.unwrap_or(&user.organization_id))
                .param_opt("requestId", request_id)
                .into_outcome());
        }

        let policy = self
            .backend
            .get_login_policy(Some(organization.unwrap_or(&user.organization_id)))
            .await?;
        let methods = self.backend.list_authentication_methods(&user.id).await?;

        if let Some(step) = check_mfa_factors(session, &policy, &methods, organization, request_id)
        {
            return Ok(step);
        }

        if let Some(request_id) = request_id {
            let record = self.store.get(&session.id)?;
            return self.finalize_callback(request_id, &record).await;
        }

        Ok(FlowOutcome::Completed(session.clone()))
    }
}

fn accounts_redirect(request_id: &str, organization: Option<&str>) -> FlowOutcome {
    RedirectTarget::new(routes::ACCOUNTS)
        .param("requestId", request_id)
        .param_opt("organization", organization)
        .into_outcome()
}
