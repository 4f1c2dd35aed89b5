//! # login-model
//!
//! Domain models for the hosted login service.
//!
//! This crate defines the types shared by the flow engine, the session
//! store and the HTTP layer: sessions and their authentication factors,
//! authorization requests, login policies, authentication method kinds,
//! user accounts, organizations and identity providers.
//!
//! All state modeled here is owned by the identity backend or by the
//! browser cookie store; these types only describe it.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod auth_request;
pub mod idp;
pub mod method;
pub mod org;
pub mod policy;
pub mod session;
pub mod user;

pub use auth_request::{AuthRequest, Prompt, Protocol, ScopeHints};
pub use idp::{IdentityProvider, IdentityProviderKind, IdpLink};
pub use method::AuthenticationMethodType;
pub use org::Organization;
pub use policy::{LoginPolicy, PasskeysType};
pub use session::{FactorCheck, Session, SessionFactors, UserFactor, WebAuthnCheck};
pub use user::{Email, Phone, UserAccount, UserState};
