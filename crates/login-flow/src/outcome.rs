//! Flow outcomes and redirect targets.

use login_model::Session;

use crate::error::FlowError;

/// App-relative page routes the flow can send the user to.
pub mod routes {
    /// Login-name collection page.
    pub const LOGIN_NAME: &str = "/loginname";
    /// Password entry page.
    pub const PASSWORD: &str = "/password";
    /// Password change page (forced rotation).
    pub const PASSWORD_CHANGE: &str = "/password/change";
    /// Passkey challenge page.
    pub const PASSKEY: &str = "/passkey";
    /// Email/invite verification page.
    pub const VERIFY: &str = "/verify";
    /// First-authenticator enrollment page.
    pub const AUTHENTICATOR_SET: &str = "/authenticator/set";
    /// Registration page.
    pub const REGISTER: &str = "/register";
    /// Account picker page.
    pub const ACCOUNTS: &str = "/accounts";
    /// Second-factor choice page.
    pub const MFA: &str = "/mfa";
    /// Second-factor enrollment page.
    pub const MFA_SET: &str = "/mfa/set";
    /// TOTP challenge page.
    pub const OTP_TIME_BASED: &str = "/otp/time-based";
    /// SMS OTP challenge page.
    pub const OTP_SMS: &str = "/otp/sms";
    /// Email OTP challenge page.
    pub const OTP_EMAIL: &str = "/otp/email";
    /// U2F challenge page.
    pub const U2F: &str = "/u2f";
    /// Generic signed-in page.
    pub const SIGNED_IN: &str = "/signedin";
}

/// The result of one flow resolution step.
///
/// Exactly three shapes leave the engine: a redirect (to a page route,
/// an identity provider, or a protocol callback URL), a classified
/// error, or a completed login with nothing further to do.
#[derive(Debug)]
pub enum FlowOutcome {
    /// Send the user agent to this URL.
    Redirect(String),
    /// The flow failed; the HTTP layer maps the kind to a response.
    Error(FlowError),
    /// The login completed with this session and no pending
    /// authorization request.
    Completed(Session),
}

impl FlowOutcome {
    /// Collapses a fallible resolution into an outcome.
    #[must_use]
    pub fn from_result(result: Result<Self, FlowError>) -> Self {
        result.unwrap_or_else(Self::Error)
    }

    /// Returns the redirect URL, if this outcome is a redirect.
    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Redirect(url) => Some(url),
            _ => None,
        }
    }
}

/// Builder for an app-relative redirect with query parameters.
///
/// Parameter order is preserved; values are form-encoded.
#[derive(Debug, Clone)]
pub struct RedirectTarget {
    path: &'static str,
    params: Vec<(&'static str, String)>,
}

impl RedirectTarget {
    /// Starts a redirect to the given route.
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            params: Vec::new(),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Appends a query parameter if the value is present.
    #[must_use]
    pub fn param_opt(mut self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.params.push((key, value.into()));
        }
        self
    }

    /// Renders the target as a URL string.
    #[must_use]
    pub fn into_url(self) -> String {
        if self.params.is_empty() {
            return self.path.to_string();
        }
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            query.append_pair(key, value);
        }
        format!("{}?{}", self.path, query.finish())
    }

    /// Renders the target as a redirect outcome.
    #[must_use]
    pub fn into_outcome(self) -> FlowOutcome {
        FlowOutcome::Redirect(self.into_url())
    }
}
