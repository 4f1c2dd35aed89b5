//! Authentication method kinds.

use serde::{Deserialize, Serialize};

/// A kind of authentication method enrolled for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationMethodType {
    /// Password credential.
    Password,
    /// Passkey (resident WebAuthn credential with user verification).
    Passkey,
    /// Link to an external identity provider.
    Idp,
    /// Time-based one-time password.
    Totp,
    /// U2F security key (second factor only).
    U2f,
    /// One-time password delivered by SMS.
    OtpSms,
    /// One-time password delivered by email.
    OtpEmail,
}

impl AuthenticationMethodType {
    /// Checks whether the method can complete a login on its own.
    ///
    /// Everything else is a second factor layered on top of a primary
    /// check.
    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Password | Self::Passkey | Self::Idp)
    }
}
