//! # login-flow
//!
//! The session-resolution and authentication-flow state machine.
//!
//! Given an inbound authorization request (OIDC or SAML) and zero or more
//! browser-held session records, this crate decides which session, if
//! any, satisfies the request, and which step the user must complete
//! next: password, passkey, OTP, MFA setup, registration, an identity
//! provider redirect, or the final protocol callback.
//!
//! Everything here is request-scoped. The engine owns no state; it reads
//! the cookie [`SessionStore`] and calls the remote [`IdentityBackend`],
//! and every backend call may fail independently.
//!
//! [`SessionStore`]: login_store::SessionStore
//! [`IdentityBackend`]: login_client::IdentityBackend

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod continuation;
pub mod error;
mod idp;
pub mod loginname;
pub mod mfa;
pub mod outcome;
pub mod select;
pub mod validity;

pub use continuation::FlowResolver;
pub use error::{FlowError, FlowResult};
pub use loginname::{LoginNameCommand, LoginNameResolver};
pub use mfa::check_mfa_factors;
pub use outcome::{routes, FlowOutcome, RedirectTarget};
pub use select::select_valid_session;
pub use validity::is_session_valid;
