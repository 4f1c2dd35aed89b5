//! Session model.
//!
//! A session is created by the identity backend on the first credential
//! check and accumulates verified factors as the user completes further
//! checks. The login service never mutates a session directly; it only
//! reads the factor timestamps the backend reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A verified authentication factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorCheck {
    /// When the factor was verified.
    pub verified_at: DateTime<Utc>,
}

impl FactorCheck {
    /// Creates a factor check verified at the given time.
    #[must_use]
    pub const fn at(verified_at: DateTime<Utc>) -> Self {
        Self { verified_at }
    }
}

/// A verified WebAuthn factor.
///
/// `user_verified` distinguishes a passkey check (user presence *and*
/// verification, e.g. biometrics or PIN) from a plain U2F touch. Only a
/// user-verified check counts as a full passkey login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAuthnCheck {
    /// When the assertion was verified.
    pub verified_at: DateTime<Utc>,
    /// Whether the authenticator performed user verification.
    pub user_verified: bool,
}

/// The user a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFactor {
    /// User id at the backend.
    pub id: String,
    /// Login name the session was established with.
    pub login_name: String,
    /// Organization the user belongs to.
    pub organization_id: String,
    /// Display name, if the backend reported one.
    pub display_name: Option<String>,
}

/// The set of factors attached to a session.
///
/// Every field is optional: a freshly created session may carry only the
/// user factor, and each completed check fills in its slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFactors {
    /// The user this session belongs to.
    pub user: Option<UserFactor>,
    /// Password check.
    pub password: Option<FactorCheck>,
    /// WebAuthn check (passkey or U2F).
    pub web_authn: Option<WebAuthnCheck>,
    /// Time-based OTP check.
    pub totp: Option<FactorCheck>,
    /// Email OTP check.
    pub otp_email: Option<FactorCheck>,
    /// SMS OTP check.
    pub otp_sms: Option<FactorCheck>,
    /// External identity provider intent check.
    pub intent: Option<FactorCheck>,
}

/// A session as reported by the identity backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier.
    pub id: String,
    /// Verified factors.
    pub factors: SessionFactors,
    /// When the session was created.
    pub creation_date: DateTime<Utc>,
    /// When the session was last touched by a check.
    pub change_date: DateTime<Utc>,
    /// When the session expires. Absent means non-expiring.
    pub expiration_date: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a session with no factors, created and changed `now`.
    #[must_use]
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            factors: SessionFactors::default(),
            creation_date: now,
            change_date: now,
            expiration_date: None,
        }
    }

    /// Sets the user factor.
    #[must_use]
    pub fn with_user(mut self, user: UserFactor) -> Self {
        self.factors.user = Some(user);
        self
    }

    /// Sets the password check timestamp.
    #[must_use]
    pub fn with_password_check(mut self, verified_at: DateTime<Utc>) -> Self {
        self.factors.password = Some(FactorCheck::at(verified_at));
        self
    }

    /// Sets the WebAuthn check.
    #[must_use]
    pub fn with_web_authn_check(mut self, verified_at: DateTime<Utc>, user_verified: bool) -> Self {
        self.factors.web_authn = Some(WebAuthnCheck {
            verified_at,
            user_verified,
        });
        self
    }

    /// Sets the TOTP check timestamp.
    #[must_use]
    pub fn with_totp_check(mut self, verified_at: DateTime<Utc>) -> Self {
        self.factors.totp = Some(FactorCheck::at(verified_at));
        self
    }

    /// Sets the email OTP check timestamp.
    #[must_use]
    pub fn with_otp_email_check(mut self, verified_at: DateTime<Utc>) -> Self {
        self.factors.otp_email = Some(FactorCheck::at(verified_at));
        self
    }

    /// Sets the SMS OTP check timestamp.
    #[must_use]
    pub fn with_otp_sms_check(mut self, verified_at: DateTime<Utc>) -> Self {
        self.factors.otp_sms = Some(FactorCheck::at(verified_at));
        self
    }

    /// Sets the identity provider intent check timestamp.
    #[must_use]
    pub fn with_intent_check(mut self, verified_at: DateTime<Utc>) -> Self {
        self.factors.intent = Some(FactorCheck::at(verified_at));
        self
    }

    /// Sets the expiration date.
    #[must_use]
    pub const fn with_expiration(mut self, expiration_date: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration_date);
        self
    }

    /// Sets the change date.
    #[must_use]
    pub const fn with_change_date(mut self, change_date: DateTime<Utc>) -> Self {
        self.change_date = change_date;
        self
    }

    /// Returns the user factor, if the session has one.
    #[must_use]
    pub const fn user(&self) -> Option<&UserFactor> {
        self.factors.user.as_ref()
    }

    /// Checks whether the session has expired at `now`.
    ///
    /// Sessions without an expiration date never expire.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|exp| exp <= now)
    }

    /// Checks whether at least one primary factor (password, WebAuthn or
    /// external identity provider) has been verified.
    #[must_use]
    pub const fn has_primary_factor(&self) -> bool {
        self.factors.password.is_some()
            || self.factors.web_authn.is_some()
            || self.factors.intent.is_some()
    }

    /// Checks whether the session was verified with a user-verified
    /// passkey.
    #[must_use]
    pub fn verified_with_passkey(&self) -> bool {
        self.factors.web_authn.is_some_and(|w| w.user_verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn user() -> UserFactor {
        UserFactor {
            id: "221".to_string(),
            login_name: "alice@example.com".to_string(),
            organization_id: "74".to_string(),
            display_name: None,
        }
    }

    #[test]
    fn session_without_expiration_never_expires() {
        let session = Session::new("s1", at(0)).with_user(user());
        assert!(!session.is_expired(at(4_102_444_800)));
    }

    #[test]
    fn session_expires_at_expiration_date() {
        let session = Session::new("s1", at(0)).with_expiration(at(100));
        assert!(!session.is_expired(at(99)));
        assert!(session.is_expired(at(100)));
        assert!(session.is_expired(at(101)));
    }

    #[test]
    fn primary_factor_requires_a_verified_check() {
        let bare = Session::new("s1", at(0)).with_user(user());
        assert!(!bare.has_primary_factor());

        let password = bare.clone().with_password_check(at(10));
        assert!(password.has_primary_factor());

        let idp = bare.clone().with_intent_check(at(10));
        assert!(idp.has_primary_factor());

        let webauthn = bare.with_web_authn_check(at(10), false);
        assert!(webauthn.has_primary_factor());
    }

    #[test]
    fn passkey_verification_requires_user_verified_flag() {
        let u2f_only = Session::new("s1", at(0)).with_web_authn_check(at(10), false);
        assert!(!u2f_only.verified_with_passkey());

        let passkey = Session::new("s2", at(0)).with_web_authn_check(at(10), true);
        assert!(passkey.verified_with_passkey());
    }
}
