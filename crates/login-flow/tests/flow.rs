//! End-to-end flow resolution scenarios against the in-memory backend.

use std::sync::Arc;

use chrono::{Duration, Utc};
use login_client::{IdentityBackend, MemoryBackend};
use login_flow::{FlowError, FlowOutcome, FlowResolver, LoginNameCommand, LoginNameResolver};
use login_model::{
    AuthRequest, AuthenticationMethodType, LoginPolicy, Prompt, Protocol, Session, UserAccount,
    UserFactor,
};
use login_store::{MemoryStore, SessionCookieRecord, SessionStore};

const BASE_URL: &str = "https://login.example.com";

struct Harness {
    backend: Arc<MemoryBackend>,
    store: Arc<MemoryStore>,
    resolver: FlowResolver,
}

impl Harness {
    fn new() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let store = Arc::new(MemoryStore::new());
        let resolver = FlowResolver::new(backend.clone(), store.clone(), BASE_URL);
        Self {
            backend,
            store,
            resolver,
        }
    }

    fn add_password_user(&self, id: &str, login_name: &str) {
        self.backend
            .add_user(UserAccount::new(id, login_name, "org-1").with_email(login_name, true));
        self.backend
            .set_authentication_methods(id, vec![AuthenticationMethodType::Password]);
    }

    /// Seeds a browser-held session for the user, valid unless stated
    /// otherwise, and returns its id.
    fn seed_session(&self, id: &str, user_id: &str, login_name: &str, valid: bool) -> String {
        let now = Utc::now();
        let mut session = Session::new(id, now - Duration::hours(1))
            .with_user(UserFactor {
                id: user_id.to_string(),
                login_name: login_name.to_string(),
                organization_id: "org-1".to_string(),
                display_name: None,
            })
            .with_password_check(now - Duration::minutes(30))
            .with_change_date(now - Duration::minutes(30));
        if !valid {
            session = session.with_expiration(now - Duration::minutes(1));
        }

        let token = format!("token-{id}");
        self.backend.insert_session(session.clone(), &token);
        self.store.insert(
            SessionCookieRecord::new(id, &token, login_name, session.creation_date)
                .with_organization("org-1")
                .with_change_date(session.change_date),
        );
        id.to_string()
    }
}

fn redirect_url(outcome: FlowOutcome) -> String {
    match outcome {
        FlowOutcome::Redirect(url) => url,
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[tokio::test]
async fn silent_prompt_without_valid_session_is_a_hard_failure() {
    let h = Harness::new();
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc).with_prompt(Prompt::None));

    let err = h.resolver.resolve("req-1", None).await.unwrap_err();
    assert!(matches!(err, FlowError::NoActiveSession));
}

#[tokio::test]
async fn silent_prompt_with_valid_session_completes_the_callback() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    h.seed_session("s-1", "u-1", "alice@example.com", true);
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc).with_prompt(Prompt::None));

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.contains("requestId=req-1"));
    assert!(h.backend.is_finalized("req-1"));
}

#[tokio::test]
async fn no_sessions_routes_to_login_name_collection() {
    let h = Harness::new();
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc));

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.starts_with("/loginname?"));
    assert!(url.contains("requestId=req-1"));
}

#[tokio::test]
async fn login_hint_without_sessions_is_auto_submitted() {
    let h = Harness::new();
    h.backend.add_auth_request(
        AuthRequest::new("req-1", Protocol::Oidc).with_login_hint("alice@example.com"),
    );

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.starts_with("/loginname?"));
    assert!(url.contains("loginName=alice%40example.com"));
    assert!(url.contains("submit=true"));
}

#[tokio::test]
async fn create_prompt_routes_to_registration() {
    let h = Harness::new();
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc).with_prompt(Prompt::Create));

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.starts_with("/register?"));
}

#[tokio::test]
async fn select_account_prompt_routes_to_account_picker() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    h.seed_session("s-1", "u-1", "alice@example.com", true);
    h.backend.add_auth_request(
        AuthRequest::new("req-1", Protocol::Oidc).with_prompt(Prompt::SelectAccount),
    );

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.starts_with("/accounts?"));
    assert!(url.contains("requestId=req-1"));
}

#[tokio::test]
async fn login_prompt_with_hint_enters_resolution_directly() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    h.seed_session("s-1", "u-1", "alice@example.com", true);
    h.backend.add_auth_request(
        AuthRequest::new("req-1", Protocol::Oidc)
            .with_prompt(Prompt::Login)
            .with_login_hint("alice@example.com"),
    );

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.starts_with("/password?"), "got {url}");
    assert!(url.contains("requestId=req-1"));
}

#[tokio::test]
async fn default_prompt_binds_the_best_session() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    h.seed_session("s-1", "u-1", "alice@example.com", true);
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc));

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.contains("requestId=req-1"));
    assert!(url.contains("sessionId=s-1"));
}

#[tokio::test]
async fn default_prompt_without_valid_session_goes_to_account_picker() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    h.seed_session("s-1", "u-1", "alice@example.com", false);
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc));

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.starts_with("/accounts?"));
}

#[tokio::test]
async fn idp_scope_hint_redirects_to_the_provider() {
    use login_model::{IdentityProvider, IdentityProviderKind};

    let h = Harness::new();
    h.backend.add_idp(IdentityProvider::new(
        "idp-1",
        "Google",
        IdentityProviderKind::Google,
    ));
    h.backend.add_auth_request(
        AuthRequest::new("req-1", Protocol::Oidc).with_scope("urn:iam:org:idp:id:idp-1"),
    );

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.starts_with("https://sso.example.test/authorize?"));
    assert!(url.contains("idp=idp-1"));
}

#[tokio::test]
async fn org_domain_scope_resolves_the_organization() {
    use login_model::Organization;

    let h = Harness::new();
    h.backend.add_organization(
        Organization::new("org-7", "Example").with_primary_domain("example.com"),
    );
    h.backend.add_auth_request(
        AuthRequest::new("req-1", Protocol::Oidc)
            .with_scope("urn:iam:org:domain:primary:example.com"),
    );

    let url = redirect_url(h.resolver.resolve("req-1", None).await.unwrap());
    assert!(url.starts_with("/loginname?"));
    assert!(url.contains("organization=org-7"));
}

#[tokio::test]
async fn finalizing_twice_falls_back_to_signed_in() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    let sid = h.seed_session("s-1", "u-1", "alice@example.com", true);
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc));

    let first = redirect_url(h.resolver.resolve("req-1", Some(&sid)).await.unwrap());
    assert!(first.contains("requestId=req-1"));

    // A stale link replaying the same request id must not surface an
    // error; the user lands on the signed-in page instead.
    let second = redirect_url(h.resolver.resolve("req-1", Some(&sid)).await.unwrap());
    assert!(second.starts_with("/signedin?"), "got {second}");
    assert!(second.contains("loginName=alice%40example.com"));
}

#[tokio::test]
async fn finalizing_twice_prefers_the_policy_redirect_uri() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    let mut policy = LoginPolicy::default();
    policy.default_redirect_uri = Some("https://app.example.com/home".to_string());
    h.backend.set_organization_policy("org-1", policy);

    let sid = h.seed_session("s-1", "u-1", "alice@example.com", true);
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Saml));

    let _ = redirect_url(h.resolver.resolve("req-1", Some(&sid)).await.unwrap());
    let second = redirect_url(h.resolver.resolve("req-1", Some(&sid)).await.unwrap());
    assert_eq!(second, "https://app.example.com/home");
}

#[tokio::test]
async fn finalizing_an_invalid_session_reenters_login() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    let sid = h.seed_session("s-1", "u-1", "alice@example.com", false);
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc));

    let url = redirect_url(h.resolver.resolve("req-1", Some(&sid)).await.unwrap());
    assert!(url.starts_with("/password?"), "got {url}");
    assert!(url.contains("loginName=alice%40example.com"));
    assert!(!h.backend.is_finalized("req-1"));
}

#[tokio::test]
async fn finalizing_an_unknown_session_fails() {
    let h = Harness::new();
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc));

    let err = h.resolver.resolve("req-1", Some("ghost")).await.unwrap_err();
    assert!(matches!(err, FlowError::SessionNotFound));
}

#[tokio::test]
async fn forced_mfa_with_nothing_enrolled_routes_to_authenticator_setup() {
    let h = Harness::new();
    h.backend.add_user(
        UserAccount::new("u-1", "alice@example.com", "org-1")
            .with_email("alice@example.com", true),
    );
    h.backend
        .set_default_policy(LoginPolicy::default().with_force_mfa(true, false));

    let resolver = LoginNameResolver::new(&*h.backend, &*h.store, BASE_URL);
    let outcome = resolver
        .resolve(&LoginNameCommand::new("alice@example.com").with_auth_request_id("req-1"))
        .await
        .unwrap();

    let url = redirect_url(outcome);
    assert!(url.starts_with("/authenticator/set?"), "got {url}");
    assert!(url.contains("loginName=alice%40example.com"));
}

#[tokio::test]
async fn continue_after_check_routes_to_mfa_setup_under_forced_mfa() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    h.backend
        .set_organization_policy("org-1", LoginPolicy::default().with_force_mfa(true, false));
    h.seed_session("s-1", "u-1", "alice@example.com", true);
    let session = h
        .backend
        .get_session("s-1", "token-s-1")
        .await
        .unwrap();

    let outcome = h
        .resolver
        .continue_after_check(&session, None, Some("req-1"))
        .await
        .unwrap();
    let url = redirect_url(outcome);
    assert!(url.starts_with("/mfa/set?"));
    assert!(url.contains("force=true"));
    assert!(url.contains("checkAfter=true"));
}

#[tokio::test]
async fn continue_after_check_finalizes_when_nothing_is_required() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    h.seed_session("s-1", "u-1", "alice@example.com", true);
    h.backend
        .add_auth_request(AuthRequest::new("req-1", Protocol::Oidc));
    let session = h.backend.get_session("s-1", "token-s-1").await.unwrap();

    let url = redirect_url(
        h.resolver
            .continue_after_check(&session, None, Some("req-1"))
            .await
            .unwrap(),
    );
    assert!(url.contains("requestId=req-1"));
    assert!(h.backend.is_finalized("req-1"));
}

#[tokio::test]
async fn continue_after_check_without_request_completes() {
    let h = Harness::new();
    h.add_password_user("u-1", "alice@example.com");
    h.seed_session("s-1", "u-1", "alice@example.com", true);
    let session = h.backend.get_session("s-1", "token-s-1").await.unwrap();

    let outcome = h
        .resolver
        .continue_after_check(&session, None, None)
        .await
        .unwrap();
    assert!(matches!(outcome, FlowOutcome::Completed(s) if s.id == "s-1"));
}

#[tokio::test]
async fn continue_after_check_forces_password_rotation_first() {
    let h = Harness::new();
    let mut user =
        UserAccount::new("u-1", "alice@example.com", "org-1").with_email("alice@example.com", true);
    user.password_change_required = true;
    h.backend.add_user(user);
    h.backend
        .set_authentication_methods("u-1", vec![AuthenticationMethodType::Password]);
    h.seed_session("s-1", "u-1", "alice@example.com", true);
    let session = h.backend.get_session("s-1", "token-s-1").await.unwrap();

    let url = redirect_url(
        h.resolver
            .continue_after_check(&session, None, Some("req-1"))
            .await
            .unwrap(),
    );
    assert!(url.starts_with("/password/change?"));
}
