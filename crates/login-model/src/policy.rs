//! Login policy model.
//!
//! Each organization has exactly one effective login policy, inherited
//! from the instance default and possibly overridden. The policy governs
//! which credential flows are offered, whether self-registration and
//! domain discovery are available, and whether a second factor is forced.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Whether passkey authentication is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PasskeysType {
    /// Passkeys may be used and enrolled.
    #[default]
    Allowed,
    /// Passkeys are disabled for this organization.
    NotAllowed,
}

/// Per-organization login policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPolicy {
    /// Allow username/password login.
    pub allow_username_password: bool,
    /// Allow self-registration.
    pub allow_register: bool,
    /// Allow organization discovery from a login-name domain suffix.
    pub allow_domain_discovery: bool,
    /// Route unknown identifiers to password entry as if they existed,
    /// to resist account enumeration.
    pub ignore_unknown_usernames: bool,
    /// Refuse email addresses as login identifiers.
    pub disable_login_with_email: bool,
    /// Refuse phone numbers as login identifiers.
    pub disable_login_with_phone: bool,
    /// Force a second factor for every login.
    pub force_mfa: bool,
    /// Force a second factor for local (non-IDP) logins only.
    pub force_mfa_local_only: bool,
    /// Passkey availability.
    pub passkeys_type: PasskeysType,
    /// Where to send the user when no authorization request is pending.
    pub default_redirect_uri: Option<String>,
    /// How long a password check satisfies a login.
    pub password_check_lifetime: Duration,
    /// How long an external IDP check satisfies a login.
    pub external_login_check_lifetime: Duration,
    /// How long a second-factor check satisfies a login.
    pub second_factor_check_lifetime: Duration,
    /// How long a multi-factor check satisfies a login.
    pub multi_factor_check_lifetime: Duration,
}

impl LoginPolicy {
    /// Checks whether any force-MFA mode is active.
    #[must_use]
    pub const fn forces_mfa(&self) -> bool {
        self.force_mfa || self.force_mfa_local_only
    }

    /// Sets both force-MFA toggles.
    #[must_use]
    pub const fn with_force_mfa(mut self, force_mfa: bool, local_only: bool) -> Self {
        self.force_mfa = force_mfa;
        self.force_mfa_local_only = local_only;
        self
    }
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            allow_username_password: true,
            allow_register: true,
            allow_domain_discovery: true,
            ignore_unknown_usernames: false,
            disable_login_with_email: false,
            disable_login_with_phone: false,
            force_mfa: false,
            force_mfa_local_only: false,
            passkeys_type: PasskeysType::Allowed,
            default_redirect_uri: None,
            password_check_lifetime: Duration::from_secs(10 * 24 * 3600),
            external_login_check_lifetime: Duration::from_secs(10 * 24 * 3600),
            second_factor_check_lifetime: Duration::from_secs(18 * 3600),
            multi_factor_check_lifetime: Duration::from_secs(12 * 3600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forces_mfa_covers_both_toggles() {
        let policy = LoginPolicy::default();
        assert!(!policy.forces_mfa());
        assert!(policy.clone().with_force_mfa(true, false).forces_mfa());
        assert!(policy.with_force_mfa(false, true).forces_mfa());
    }
}
