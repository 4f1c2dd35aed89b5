//! Identity provider models.

use serde::{Deserialize, Serialize};

/// The kind of an external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityProviderKind {
    /// Generic OIDC provider.
    Oidc,
    /// Generic OAuth2 provider.
    Oauth,
    /// SAML 2.0 provider.
    Saml,
    /// Google.
    Google,
    /// GitHub.
    Github,
    /// GitLab.
    Gitlab,
    /// Microsoft Entra ID.
    AzureAd,
    /// Apple.
    Apple,
    /// LDAP directory.
    Ldap,
}

impl IdentityProviderKind {
    /// Returns the URL slug used for the provider's success/failure
    /// redirect endpoints.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Oidc => "oidc",
            Self::Oauth => "oauth",
            Self::Saml => "saml",
            Self::Google => "google",
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::AzureAd => "azure",
            Self::Apple => "apple",
            Self::Ldap => "ldap",
        }
    }
}

/// An external identity provider configured for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProvider {
    /// Provider id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Provider kind.
    pub kind: IdentityProviderKind,
}

impl IdentityProvider {
    /// Creates a provider.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: IdentityProviderKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

/// A link between a local user and an external identity provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdpLink {
    /// Provider id.
    pub idp_id: String,
    /// Local user id.
    pub user_id: String,
    /// User id at the provider.
    pub provider_user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_url_safe() {
        let kinds = [
            IdentityProviderKind::Oidc,
            IdentityProviderKind::Oauth,
            IdentityProviderKind::Saml,
            IdentityProviderKind::Google,
            IdentityProviderKind::Github,
            IdentityProviderKind::Gitlab,
            IdentityProviderKind::AzureAd,
            IdentityProviderKind::Apple,
            IdentityProviderKind::Ldap,
        ];
        for kind in kinds {
            let slug = kind.slug();
            assert!(!slug.is_empty());
            assert!(slug.chars().all(|c| c.is_ascii_lowercase()));
        }
    }
}
