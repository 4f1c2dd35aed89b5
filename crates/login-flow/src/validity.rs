//! Session validity evaluation.

use chrono::Utc;
use login_client::IdentityBackend;
use login_model::{AuthenticationMethodType, Session};

use crate::error::FlowResult;

/// Decides whether a session can satisfy a login right now.
///
/// A session is valid when all three hold:
///
/// 1. Its required second factor is verified. The strongest enrolled
///    factor decides which check counts, in the order TOTP, then email
///    OTP, then SMS OTP, then U2F; a user who has TOTP enrolled cannot
///    satisfy MFA through a weaker channel. With no second factor
///    enrolled, the organization's force-MFA policy decides whether any
///    verified extra factor is required at all.
/// 2. At least one primary factor (password, WebAuthn or external
///    identity provider) is verified.
/// 3. The session is not expired. Sessions without an expiration date do
///    not expire.
///
/// Fails closed when the session carries no user.
///
/// ## Errors
///
/// Propagates backend failures from the method and policy lookups.
pub async fn is_session_valid(
    backend: &dyn IdentityBackend,
    session: &Session,
) -> FlowResult<bool> {
    let Some(user) = session.user() else {
        tracing::warn!(session_id = %session.id, "session has no user");
        return Ok(false);
    };

    let methods = backend.list_authentication_methods(&user.id).await?;

    let mfa_valid = if methods.contains(&AuthenticationMethodType::Totp) {
        let valid = session.factors.totp.is_some();
        if !valid {
            tracing::warn!(session_id = %session.id, "session has no verified totp factor");
        }
        valid
    } else if methods.contains(&AuthenticationMethodType::OtpEmail) {
        let valid = session.factors.otp_email.is_some();
        if !valid {
            tracing::warn!(session_id = %session.id, "session has no verified email otp factor");
        }
        valid
    } else if methods.contains(&AuthenticationMethodType::OtpSms) {
        let valid = session.factors.otp_sms.is_some();
        if !valid {
            tracing::warn!(session_id = %session.id, "session has no verified sms otp factor");
        }
        valid
    } else if methods.contains(&AuthenticationMethodType::U2f) {
        let valid = session.factors.web_authn.is_some();
        if !valid {
            tracing::warn!(session_id = %session.id, "session has no verified u2f factor");
        }
        valid
    } else {
        // Nothing enrolled: only a forced-MFA policy can still require a
        // verified extra factor.
        let policy = backend
            .get_login_policy(Some(&user.organization_id))
            .await?;
        if policy.forces_mfa() {
            let valid = session.factors.otp_email.is_some()
                || session.factors.otp_sms.is_some()
                || session.factors.totp.is_some()
                || session.factors.web_authn.is_some()
                || session.factors.intent.is_some();
            if !valid {
                tracing::warn!(session_id = %session.id, "forced mfa but no verified extra factor");
            }
            valid
        } else {
            true
        }
    };

    let has_primary = session.has_primary_factor();
    let not_expired = !session.is_expired(Utc::now());
    if !not_expired {
        tracing::warn!(session_id = %session.id, "session is expired");
    }

    Ok(mfa_valid && has_primary && not_expired)
}
