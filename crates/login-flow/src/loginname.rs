//! Login-name resolution.
//!
//! Turns a typed identifier into the next step of the flow: a credential
//! challenge, enrollment, registration, an identity provider redirect,
//! or a classified error. Branch order encodes policy precedence and
//! must not be reordered.

use login_client::{BackendError, IdentityBackend, SessionChecks, UserQuery, UserSearchKey};
use login_model::{
    AuthenticationMethodType, LoginPolicy, PasskeysType, Session, UserAccount, UserFactor,
    UserState,
};
use login_store::{SessionCookieRecord, SessionStore};

use crate::error::{FlowError, FlowResult};
use crate::idp::start_idp_redirect;
use crate::outcome::{routes, FlowOutcome, RedirectTarget};

/// A submitted login name with its flow context.
#[derive(Debug, Clone)]
pub struct LoginNameCommand {
    /// The typed identifier: login name, email or phone number.
    pub login_name: String,
    /// Organization constraint, if the flow carries one.
    pub organization: Option<String>,
    /// Pending authorization request to thread through the redirects.
    pub auth_request_id: Option<String>,
}

impl LoginNameCommand {
    /// Creates a command with no organization or request context.
    #[must_use]
    pub fn new(login_name: impl Into<String>) -> Self {
        Self {
            login_name: login_name.into(),
            organization: None,
            auth_request_id: None,
        }
    }

    /// Sets the organization constraint.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Sets the pending authorization request.
    #[must_use]
    pub fn with_auth_request_id(mut self, auth_request_id: impl Into<String>) -> Self {
        self.auth_request_id = Some(auth_request_id.into());
        self
    }
}

/// Resolves login names against the backend and the tenant policy.
pub struct LoginNameResolver<'a> {
    backend: &'a dyn IdentityBackend,
    store: &'a dyn SessionStore,
    base_url: &'a str,
}

impl<'a> LoginNameResolver<'a> {
    /// Creates a resolver.
    ///
    /// `base_url` is this service's externally visible origin, used for
    /// identity provider return URLs.
    #[must_use]
    pub fn new(
        backend: &'a dyn IdentityBackend,
        store: &'a dyn SessionStore,
        base_url: &'a str,
    ) -> Self {
        Self {
            backend,
            store,
            base_url,
        }
    }

    /// Resolves an identifier to the next flow step.
    ///
    /// ## Errors
    ///
    /// - [`FlowError::AmbiguousUser`] when several accounts match.
    /// - [`FlowError::UnsupportedState`] when the account never finished
    ///   setup.
    /// - [`FlowError::PolicyDenied`] when the only available method is
    ///   disallowed by policy.
    /// - [`FlowError::UserNotFound`] when nothing matches and no policy
    ///   branch offers a fallback.
    /// - [`FlowError::Backend`] for remote failures.
    pub async fn resolve(&self, command: &LoginNameCommand) -> FlowResult<FlowOutcome> {
        let mut query = UserQuery::by_login_name(&command.login_name);
        if let Some(organization) = &command.organization {
            query = query.in_organization(organization);
        }
        let users = self.backend.list_users(&query).await?;
        let policy = self
            .backend
            .get_login_policy(command.organization.as_deref())
            .await?;

        let matches: Vec<&UserAccount> = users
            .iter()
            .filter(|user| identifier_permitted(user, &policy, &command.login_name))
            .collect();

        match matches.as_slice() {
            [user] => self.resolve_known_user(user, &policy, command).await,
            [] => self.resolve_unknown_user(&policy, command).await,
            _ => Err(FlowError::AmbiguousUser),
        }
    }

    /// Exactly one account matched: bind a session to it and route to
    /// the method the user must verify.
    async fn resolve_known_user(
        &self,
        user: &UserAccount,
        policy: &LoginPolicy,
        command: &LoginNameCommand,
    ) -> FlowResult<FlowOutcome> {
        let session = self.establish_session(user, command).await?;
        let Some(session_user) = session.user().cloned() else {
            return Err(FlowError::Backend(BackendError::InvalidResponse(
                "created session carries no user factor".into(),
            )));
        };

        if user.state == UserState::Initial {
            return Err(FlowError::UnsupportedState);
        }

        let methods = self
            .backend
            .list_authentication_methods(&user.id)
            .await?;
        let organization = command
            .organization
            .clone()
            .unwrap_or_else(|| session_user.organization_id.clone());
        let request_id = command.auth_request_id.as_deref();

        if methods.is_empty() {
            return Ok(self.enrollment_redirect(user, &session_user, &organization, request_id));
        }

        if let [method] = methods.as_slice() {
            return match method {
                AuthenticationMethodType::Password => {
                    if !policy.allow_username_password {
                        return Err(FlowError::policy_denied(
                            "username and password login is not allowed for this organization",
                        ));
                    }
                    Ok(RedirectTarget::new(routes::PASSWORD)
                        .param("loginName", &session_user.login_name)
                        .param("organization", &organization)
                        .param_opt("requestId", request_id)
                        .into_outcome())
                }
                AuthenticationMethodType::Passkey => {
                    if policy.passkeys_type == PasskeysType::NotAllowed {
                        return Err(FlowError::policy_denied(
                            "passkeys are not allowed for this organization",
                        ));
                    }
                    Ok(RedirectTarget::new(routes::PASSKEY)
                        .param("loginName", &command.login_name)
                        .param_opt("requestId", request_id)
                        .param("organization", &organization)
                        .into_outcome())
                }
                AuthenticationMethodType::Idp => {
                    match self.redirect_via_linked_idp(user, command).await? {
                        Some(outcome) => Ok(outcome),
                        None => Err(FlowError::policy_denied(
                            "no identity provider is available for this account",
                        )),
                    }
                }
                // A lone second factor means enrollment never finished;
                // send the user back to authenticator setup.
                _ => Ok(self.enrollment_redirect(user, &session_user, &organization, request_id)),
            };
        }

        // Several methods: prefer passkey, then a single linked identity
        // provider, then password.
        if methods.contains(&AuthenticationMethodType::Passkey) {
            let alt_password = methods.contains(&AuthenticationMethodType::Password);
            return Ok(RedirectTarget::new(routes::PASSKEY)
                .param("loginName", &command.login_name)
                .param("altPassword", alt_password.to_string())
                .param_opt("requestId", request_id)
                .param("organization", &organization)
                .into_outcome());
        }
        if methods.contains(&AuthenticationMethodType::Idp) {
            if let Some(outcome) = self.redirect_via_linked_idp(user, command).await? {
                return Ok(outcome);
            }
        }
        if methods.contains(&AuthenticationMethodType::Password) {
            return Ok(RedirectTarget::new(routes::PASSWORD)
                .param("loginName", &command.login_name)
                .param_opt("requestId", request_id)
                .param("organization", &organization)
                .into_outcome());
        }

        Ok(self.enrollment_redirect(user, &session_user, &organization, request_id))
    }

    /// No account matched: registration, a single-IDP redirect, or the
    /// enumeration-resistant password page, in policy order.
    async fn resolve_unknown_user(
        &self,
        policy: &LoginPolicy,
        command: &LoginNameCommand,
    ) -> FlowResult<FlowOutcome> {
        if policy.allow_register && !policy.allow_username_password {
            if let Some(outcome) = self.redirect_to_single_active_idp(command).await? {
                return Ok(outcome);
            }
            return Err(FlowError::UserNotFound);
        }

        if policy.allow_register && policy.allow_username_password {
            let mut register_organization = command.organization.clone();

            if !policy.ignore_unknown_usernames && register_organization.is_none() {
                register_organization = self.discover_organization(&command.login_name).await?;
            }

            if let Some(organization) = register_organization {
                if !policy.ignore_unknown_usernames {
                    return Ok(RedirectTarget::new(routes::REGISTER)
                        .param("organization", organization)
                        .param_opt("requestId", command.auth_request_id.as_deref())
                        .param("loginName", &command.login_name)
                        .into_outcome());
                }
            }
        }

        // ## NIST 800-53 Rev5: IA-6 (Authentication Feedback)
        //
        // Unknown identifiers take the same route as a known
        // password-only account, so responses cannot be used to probe
        // which accounts exist.
        if policy.ignore_unknown_usernames {
            return Ok(RedirectTarget::new(routes::PASSWORD)
                .param("loginName", &command.login_name)
                .param_opt("requestId", command.auth_request_id.as_deref())
                .param_opt("organization", command.organization.clone())
                .into_outcome());
        }

        Err(FlowError::UserNotFound)
    }

    /// Maps an identifier's domain suffix to an organization, if exactly
    /// one organization claims the domain and enables domain discovery.
    async fn discover_organization(&self, login_name: &str) -> FlowResult<Option<String>> {
        let Some((_, domain)) = login_name.rsplit_once('@') else {
            return Ok(None);
        };
        if domain.is_empty() {
            return Ok(None);
        }

        let organizations = self.backend.get_orgs_by_domain(domain).await?;
        let [organization] = organizations.as_slice() else {
            return Ok(None);
        };

        let organization_policy = self
            .backend
            .get_login_policy(Some(&organization.id))
            .await?;
        if organization_policy.allow_domain_discovery {
            Ok(Some(organization.id.clone()))
        } else {
            Ok(None)
        }
    }

    /// Creates a session bound to the user and writes its cookie record.
    async fn establish_session(
        &self,
        user: &UserAccount,
        command: &LoginNameCommand,
    ) -> FlowResult<Session> {
        let checks = SessionChecks::for_user(UserSearchKey::UserId(user.id.clone()));
        let created = self.backend.create_session(&checks).await?;
        let session = self.backend.get_session(&created.id, &created.token).await?;

        let login_name = session
            .user()
            .map_or_else(|| user.preferred_login_name.clone(), |u| u.login_name.clone());
        let mut record =
            SessionCookieRecord::new(&session.id, &created.token, login_name, session.creation_date)
                .with_change_date(session.change_date);
        record.organization = Some(
            command
                .organization
                .clone()
                .unwrap_or_else(|| user.organization_id.clone()),
        );
        record.expiration_date = session.expiration_date;
        record.auth_request_id = command.auth_request_id.clone();
        self.store.insert(record);

        Ok(session)
    }

    /// Zero methods enrolled: unverified email goes to invite
    /// verification, everything else to first-authenticator setup.
    fn enrollment_redirect(
        &self,
        user: &UserAccount,
        session_user: &UserFactor,
        organization: &str,
        request_id: Option<&str>,
    ) -> FlowOutcome {
        if user.email.as_ref().is_some_and(|e| !e.is_verified) {
            return RedirectTarget::new(routes::VERIFY)
                .param("loginName", &session_user.login_name)
                .param("userId", &session_user.id)
                .param("invite", "true")
                .param("organization", organization)
                .param_opt("requestId", request_id)
                .into_outcome();
        }

        RedirectTarget::new(routes::AUTHENTICATOR_SET)
            .param("loginName", &session_user.login_name)
            .param("userId", &session_user.id)
            .param("organization", organization)
            .param_opt("requestId", request_id)
            .into_outcome()
    }

    /// Redirects through the user's linked identity provider, if exactly
    /// one link exists.
    async fn redirect_via_linked_idp(
        &self,
        user: &UserAccount,
        command: &LoginNameCommand,
    ) -> FlowResult<Option<FlowOutcome>> {
        let links = self.backend.list_idp_links(&user.id).await?;
        let [link] = links.as_slice() else {
            return Ok(None);
        };

        let idp = self.backend.get_idp_by_id(&link.idp_id).await?;
        let outcome = start_idp_redirect(
            self.backend,
            self.base_url,
            &idp,
            command.auth_request_id.as_deref(),
            command.organization.as_deref(),
        )
        .await?;
        Ok(Some(outcome))
    }

    /// Redirects to the organization's only active identity provider,
    /// if there is exactly one.
    async fn redirect_to_single_active_idp(
        &self,
        command: &LoginNameCommand,
    ) -> FlowResult<Option<FlowOutcome>> {
        let idps = self
            .backend
            .list_active_idps(command.organization.as_deref())
            .await?;
        let [idp] = idps.as_slice() else {
            return Ok(None);
        };

        let outcome = start_idp_redirect(
            self.backend,
            self.base_url,
            idp,
            command.auth_request_id.as_deref(),
            command.organization.as_deref(),
        )
        .await?;
        Ok(Some(outcome))
    }
}

/// Applies the policy's identifier filters to a matched account.
///
/// With email login disabled a match survives only with a verified email
/// that is not the typed identifier; the phone filter is analogous and
/// only applies when the email filter does not.
fn identifier_permitted(user: &UserAccount, policy: &LoginPolicy, login_name: &str) -> bool {
    if policy.disable_login_with_email {
        user.email
            .as_ref()
            .is_some_and(|e| e.is_verified && e.address != login_name)
    } else if policy.disable_login_with_phone {
        user.phone
            .as_ref()
            .is_some_and(|p| p.is_verified && p.number != login_name)
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use login_client::MemoryBackend;
    use login_model::{IdentityProvider, IdentityProviderKind, IdpLink, Organization};
    use login_store::{MemoryStore, SessionStore};

    const BASE_URL: &str = "https://login.example.com";

    fn alice() -> UserAccount {
        UserAccount::new("u-1", "alice@example.com", "org-1")
            .with_email("alice@example.com", true)
    }

    fn redirect_url(outcome: FlowOutcome) -> String {
        match outcome {
            FlowOutcome::Redirect(url) => url,
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    async fn resolve(
        backend: &MemoryBackend,
        store: &MemoryStore,
        command: &LoginNameCommand,
    ) -> FlowResult<FlowOutcome> {
        LoginNameResolver::new(backend, store, BASE_URL)
            .resolve(command)
            .await
    }

    #[tokio::test]
    async fn password_only_user_routes_to_password() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods("u-1", vec![AuthenticationMethodType::Password]);
        let store = MemoryStore::new();

        let command = LoginNameCommand::new("alice@example.com").with_auth_request_id("req-1");
        let url = redirect_url(resolve(&backend, &store, &command).await.unwrap());

        assert!(url.starts_with("/password?"));
        assert!(url.contains("loginName=alice%40example.com"));
        assert!(url.contains("requestId=req-1"));
    }

    #[tokio::test]
    async fn resolution_writes_a_cookie_record() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods("u-1", vec![AuthenticationMethodType::Password]);
        let store = MemoryStore::new();

        let command = LoginNameCommand::new("alice@example.com").with_auth_request_id("req-1");
        resolve(&backend, &store, &command).await.unwrap();

        let record = store
            .find_by_login_name("alice@example.com", None)
            .unwrap();
        assert_eq!(record.auth_request_id.as_deref(), Some("req-1"));
        assert_eq!(record.organization.as_deref(), Some("org-1"));
        assert!(backend
            .get_session(&record.id, &record.token)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn resolution_is_deterministic() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods("u-1", vec![AuthenticationMethodType::Password]);
        let store = MemoryStore::new();

        let command = LoginNameCommand::new("alice@example.com");
        let first = redirect_url(resolve(&backend, &store, &command).await.unwrap());
        let second = redirect_url(resolve(&backend, &store, &command).await.unwrap());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn initial_account_is_unsupported() {
        let backend = MemoryBackend::new();
        backend.add_user(alice().with_state(UserState::Initial));
        let store = MemoryStore::new();

        let err = resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::UnsupportedState));
    }

    #[tokio::test]
    async fn no_methods_and_unverified_email_routes_to_invite_verification() {
        let backend = MemoryBackend::new();
        backend.add_user(
            UserAccount::new("u-1", "alice@example.com", "org-1")
                .with_email("alice@example.com", false),
        );
        let store = MemoryStore::new();

        let url = redirect_url(
            resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
                .await
                .unwrap(),
        );
        assert!(url.starts_with("/verify?"));
        assert!(url.contains("invite=true"));
        assert!(url.contains("userId=u-1"));
    }

    #[tokio::test]
    async fn no_methods_routes_to_authenticator_setup() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        let store = MemoryStore::new();

        let url = redirect_url(
            resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
                .await
                .unwrap(),
        );
        assert!(url.starts_with("/authenticator/set?"));
        assert!(url.contains("loginName=alice%40example.com"));
    }

    #[tokio::test]
    async fn password_login_disabled_by_policy_is_denied() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods("u-1", vec![AuthenticationMethodType::Password]);
        let mut policy = LoginPolicy::default();
        policy.allow_username_password = false;
        backend.set_default_policy(policy);
        let store = MemoryStore::new();

        let err = resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::PolicyDenied(_)));
    }

    #[tokio::test]
    async fn passkeys_disabled_by_policy_is_denied() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods("u-1", vec![AuthenticationMethodType::Passkey]);
        let mut policy = LoginPolicy::default();
        policy.passkeys_type = PasskeysType::NotAllowed;
        backend.set_default_policy(policy);
        let store = MemoryStore::new();

        let err = resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::PolicyDenied(_)));
    }

    #[tokio::test]
    async fn passkey_is_preferred_over_password() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods(
            "u-1",
            vec![
                AuthenticationMethodType::Password,
                AuthenticationMethodType::Passkey,
            ],
        );
        let store = MemoryStore::new();

        let url = redirect_url(
            resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
                .await
                .unwrap(),
        );
        assert!(url.starts_with("/passkey?"));
        assert!(url.contains("altPassword=true"));
    }

    #[tokio::test]
    async fn single_idp_link_redirects_to_provider() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods(
            "u-1",
            vec![
                AuthenticationMethodType::Password,
                AuthenticationMethodType::Idp,
            ],
        );
        backend.add_idp(IdentityProvider::new(
            "idp-1",
            "Google",
            IdentityProviderKind::Google,
        ));
        backend.add_idp_link(IdpLink {
            idp_id: "idp-1".to_string(),
            user_id: "u-1".to_string(),
            provider_user_id: "g-1".to_string(),
        });
        let store = MemoryStore::new();

        let url = redirect_url(
            resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
                .await
                .unwrap(),
        );
        assert!(url.starts_with("https://sso.example.test/authorize?"));
        assert!(url.contains("idp=idp-1"));
    }

    #[tokio::test]
    async fn ambiguous_match_is_an_error() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.add_user(
            UserAccount::new("u-2", "alice", "org-2").with_email("alice@example.com", true),
        );
        let store = MemoryStore::new();

        let err = resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::AmbiguousUser));
    }

    #[tokio::test]
    async fn unknown_user_without_register_is_not_found() {
        let backend = MemoryBackend::new();
        let mut policy = LoginPolicy::default();
        policy.allow_register = false;
        backend.set_default_policy(policy);
        let store = MemoryStore::new();

        let err = resolve(&backend, &store, &LoginNameCommand::new("nobody@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::UserNotFound));
    }

    #[tokio::test]
    async fn unknown_user_with_domain_discovery_routes_to_register() {
        let backend = MemoryBackend::new();
        backend.add_organization(
            Organization::new("org-9", "Example").with_primary_domain("example.com"),
        );
        let store = MemoryStore::new();

        let url = redirect_url(
            resolve(&backend, &store, &LoginNameCommand::new("new@example.com"))
                .await
                .unwrap(),
        );
        assert!(url.starts_with("/register?"));
        assert!(url.contains("organization=org-9"));
        assert!(url.contains("loginName=new%40example.com"));
    }

    #[tokio::test]
    async fn domain_discovery_requires_the_org_policy_toggle() {
        let backend = MemoryBackend::new();
        backend.add_organization(
            Organization::new("org-9", "Example").with_primary_domain("example.com"),
        );
        let mut org_policy = LoginPolicy::default();
        org_policy.allow_domain_discovery = false;
        backend.set_organization_policy("org-9", org_policy);
        let store = MemoryStore::new();

        let err = resolve(&backend, &store, &LoginNameCommand::new("new@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::UserNotFound));
    }

    #[tokio::test]
    async fn domain_discovery_requires_a_unique_org() {
        let backend = MemoryBackend::new();
        backend.add_organization(
            Organization::new("org-8", "One").with_primary_domain("example.com"),
        );
        backend.add_organization(
            Organization::new("org-9", "Two").with_primary_domain("example.com"),
        );
        let store = MemoryStore::new();

        let err = resolve(&backend, &store, &LoginNameCommand::new("new@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::UserNotFound));
    }

    #[tokio::test]
    async fn unknown_user_with_ignore_unknown_routes_to_password() {
        let backend = MemoryBackend::new();
        let mut policy = LoginPolicy::default();
        policy.ignore_unknown_usernames = true;
        backend.set_default_policy(policy);
        let store = MemoryStore::new();

        let url = redirect_url(
            resolve(
                &backend,
                &store,
                &LoginNameCommand::new("nobody@example.com").with_auth_request_id("req-1"),
            )
            .await
            .unwrap(),
        );
        assert!(url.starts_with("/password?"));
        assert!(url.contains("loginName=nobody%40example.com"));
        assert!(url.contains("requestId=req-1"));
    }

    #[tokio::test]
    async fn unknown_route_matches_known_password_route_shape() {
        // With unknown usernames ignored, an unknown identifier and a
        // known password-only account must be indistinguishable by route.
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods("u-1", vec![AuthenticationMethodType::Password]);
        let mut policy = LoginPolicy::default();
        policy.ignore_unknown_usernames = true;
        backend.set_default_policy(policy);
        let store = MemoryStore::new();

        let known = redirect_url(
            resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
                .await
                .unwrap(),
        );
        let unknown = redirect_url(
            resolve(&backend, &store, &LoginNameCommand::new("ghost@example.com"))
                .await
                .unwrap(),
        );

        let path = |url: &str| url.split('?').next().unwrap().to_string();
        assert_eq!(path(&known), path(&unknown));
        assert!(unknown.contains("loginName=ghost%40example.com"));
    }

    #[tokio::test]
    async fn register_without_password_login_redirects_to_single_idp() {
        let backend = MemoryBackend::new();
        let mut policy = LoginPolicy::default();
        policy.allow_username_password = false;
        backend.set_default_policy(policy);
        backend.add_idp(IdentityProvider::new(
            "idp-1",
            "Google",
            IdentityProviderKind::Google,
        ));
        let store = MemoryStore::new();

        let url = redirect_url(
            resolve(&backend, &store, &LoginNameCommand::new("nobody@example.com"))
                .await
                .unwrap(),
        );
        assert!(url.starts_with("https://sso.example.test/authorize?"));
    }

    #[tokio::test]
    async fn email_login_disabled_filters_email_identifier() {
        let backend = MemoryBackend::new();
        backend.add_user(alice());
        backend.set_authentication_methods("u-1", vec![AuthenticationMethodType::Password]);
        let mut policy = LoginPolicy::default();
        policy.disable_login_with_email = true;
        policy.allow_register = false;
        backend.set_default_policy(policy);
        let store = MemoryStore::new();

        // Typing the email address itself no longer matches the account.
        let err = resolve(&backend, &store, &LoginNameCommand::new("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::UserNotFound));
    }
}
