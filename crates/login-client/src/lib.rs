//! # login-client
//!
//! Client for the remote identity backend.
//!
//! The login service holds no identity state of its own; users, sessions,
//! policies and authorization requests all live behind a remote API. This
//! crate defines the [`IdentityBackend`] contract the flow engine is
//! written against, plus two implementations:
//!
//! - [`HttpBackend`] — JSON over HTTP via `reqwest`
//! - [`MemoryBackend`] — in-process state for tests and demos
//!
//! Every operation is an independent, fallible network call. The client
//! performs no retries; retry policy belongs to the transport layer.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod backend;
pub mod error;
pub mod http;
pub mod memory;

pub use backend::{
    CreatedSession, IdentityBackend, SessionBinding, SessionChecks, SessionPatch, UserQuery,
    UserSearchKey,
};
pub use error::{BackendError, BackendResult};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
