//! MFA requirement resolution.

use login_model::{AuthenticationMethodType, LoginPolicy, Session};

use crate::outcome::{routes, FlowOutcome, RedirectTarget};

/// Decides whether a session needs a further factor, and which.
///
/// Returns the challenge or enrollment redirect the user must complete,
/// or `None` when the session satisfies the policy as it stands. The
/// guards run in a fixed order:
///
/// 1. A user-verified passkey check suffices on its own.
/// 2. Exactly one extra factor enrolled routes to that factor's
///    challenge page.
/// 3. Several extra factors route to the factor-choice page.
/// 4. No extra factor but a force-MFA policy routes to enrollment, with
///    flags to verify immediately after setup.
pub fn check_mfa_factors(
    session: &Session,
    policy: &LoginPolicy,
    methods: &[AuthenticationMethodType],
    organization: Option<&str>,
    request_id: Option<&str>,
) -> Option<FlowOutcome> {
    let user = session.user()?;

    if session.verified_with_passkey() {
        return None;
    }

    let extra_factors: Vec<AuthenticationMethodType> = methods
        .iter()
        .copied()
        .filter(|m| {
            !matches!(
                m,
                AuthenticationMethodType::Password | AuthenticationMethodType::Passkey
            )
        })
        .collect();

    let organization = organization.unwrap_or(&user.organization_id);
    let target = |path: &'static str| {
        RedirectTarget::new(path)
            .param("loginName", &user.login_name)
            .param_opt("requestId", request_id)
            .param("organization", organization)
    };

    match extra_factors.as_slice() {
        [factor] => {
            let path = match factor {
                AuthenticationMethodType::Totp => routes::OTP_TIME_BASED,
                AuthenticationMethodType::OtpSms => routes::OTP_SMS,
                AuthenticationMethodType::OtpEmail => routes::OTP_EMAIL,
                AuthenticationMethodType::U2f => routes::U2F,
                // An identity provider link has no challenge page of its
                // own; nothing further to complete.
                _ => return None,
            };
            Some(target(path).into_outcome())
        }
        [] if policy.forces_mfa() => Some(
            RedirectTarget::new(routes::MFA_SET)
                .param("loginName", &user.login_name)
                .param("force", "true")
                .param("checkAfter", "true")
                .param_opt("requestId", request_id)
                .param("organization", organization)
                .into_outcome(),
        ),
        [] => None,
        _ => Some(target(routes::MFA).into_outcome()),
    }
}
