//! Authorization request model.
//!
//! An authorization request is a pending OIDC or SAML sign-in issued by
//! the protocol layer. It is immutable once issued and consumed exactly
//! once, when the flow binds a session to it and finalizes the callback.

use serde::{Deserialize, Serialize};

/// Scope prefix carrying an organization id constraint.
const ORG_SCOPE_PREFIX: &str = "urn:iam:org:id:";
/// Scope prefix carrying an organization primary-domain constraint.
const ORG_DOMAIN_SCOPE_PREFIX: &str = "urn:iam:org:domain:primary:";
/// Scope prefix carrying an identity provider constraint.
const IDP_SCOPE_PREFIX: &str = "urn:iam:org:idp:id:";

/// The protocol an authorization request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// OpenID Connect.
    Oidc,
    /// SAML 2.0.
    Saml,
}

/// Protocol-level prompt directive constraining flow interactivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    /// No user interaction permitted; silent authentication only.
    None,
    /// Force re-authentication even with a valid session.
    Login,
    /// Let the user pick between available accounts.
    SelectAccount,
    /// Start with account registration.
    Create,
}

/// Hints extracted from an authorization request's scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeHints {
    /// Requested organization id.
    pub organization_id: Option<String>,
    /// Requested organization primary domain.
    pub organization_domain: Option<String>,
    /// Requested identity provider id.
    pub idp_id: Option<String>,
}

/// A pending authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    /// Request identifier, assigned by the protocol layer.
    pub id: String,
    /// Protocol the request was issued under.
    pub protocol: Protocol,
    /// Requested prompts.
    pub prompts: Vec<Prompt>,
    /// Login-name hint, if the client supplied one.
    pub login_hint: Option<String>,
    /// User-id hint, if the client supplied one.
    pub hint_user_id: Option<String>,
    /// Raw requested scopes.
    pub scope: Vec<String>,
}

impl AuthRequest {
    /// Creates a request with no prompts, hints or scopes.
    #[must_use]
    pub fn new(id: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            id: id.into(),
            protocol,
            prompts: Vec::new(),
            login_hint: None,
            hint_user_id: None,
            scope: Vec::new(),
        }
    }

    /// Adds a prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompts.push(prompt);
        self
    }

    /// Sets the login-name hint.
    #[must_use]
    pub fn with_login_hint(mut self, hint: impl Into<String>) -> Self {
        self.login_hint = Some(hint.into());
        self
    }

    /// Sets the user-id hint.
    #[must_use]
    pub fn with_hint_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.hint_user_id = Some(user_id.into());
        self
    }

    /// Adds a scope string.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope.push(scope.into());
        self
    }

    /// Checks whether the request carries the given prompt.
    #[must_use]
    pub fn has_prompt(&self, prompt: Prompt) -> bool {
        self.prompts.contains(&prompt)
    }

    /// Extracts organization / domain / identity provider hints from the
    /// request's scopes.
    ///
    /// The first scope matching each prefix wins. An organization id hint
    /// and a domain hint may both be present; the caller decides which one
    /// applies (an explicit id takes precedence over domain discovery).
    #[must_use]
    pub fn scope_hints(&self) -> ScopeHints {
        let mut hints = ScopeHints::default();
        for scope in &self.scope {
            if let Some(id) = scope.strip_prefix(ORG_SCOPE_PREFIX) {
                if hints.organization_id.is_none() && !id.is_empty() {
                    hints.organization_id = Some(id.to_string());
                }
            } else if let Some(domain) = scope.strip_prefix(ORG_DOMAIN_SCOPE_PREFIX) {
                if hints.organization_domain.is_none() && !domain.is_empty() {
                    hints.organization_domain = Some(domain.to_string());
                }
            } else if let Some(idp) = scope.strip_prefix(IDP_SCOPE_PREFIX) {
                if hints.idp_id.is_none() && !idp.is_empty() {
                    hints.idp_id = Some(idp.to_string());
                }
            }
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_hints_extracts_each_kind() {
        let request = AuthRequest::new("req-1", Protocol::Oidc)
            .with_scope("openid")
            .with_scope("urn:iam:org:id:167")
            .with_scope("urn:iam:org:idp:id:google-1");

        let hints = request.scope_hints();
        assert_eq!(hints.organization_id.as_deref(), Some("167"));
        assert_eq!(hints.organization_domain, None);
        assert_eq!(hints.idp_id.as_deref(), Some("google-1"));
    }

    #[test]
    fn scope_hints_reads_domain_scope() {
        let request = AuthRequest::new("req-1", Protocol::Oidc)
            .with_scope("urn:iam:org:domain:primary:example.com");

        let hints = request.scope_hints();
        assert_eq!(hints.organization_domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn empty_suffix_is_ignored() {
        let request = AuthRequest::new("req-1", Protocol::Oidc).with_scope("urn:iam:org:id:");
        assert_eq!(request.scope_hints(), ScopeHints::default());
    }

    #[test]
    fn first_matching_scope_wins() {
        let request = AuthRequest::new("req-1", Protocol::Oidc)
            .with_scope("urn:iam:org:id:1")
            .with_scope("urn:iam:org:id:2");
        assert_eq!(request.scope_hints().organization_id.as_deref(), Some("1"));
    }

    #[test]
    fn prompts_are_queryable() {
        let request = AuthRequest::new("req-1", Protocol::Saml).with_prompt(Prompt::SelectAccount);
        assert!(request.has_prompt(Prompt::SelectAccount));
        assert!(!request.has_prompt(Prompt::None));
    }
}
