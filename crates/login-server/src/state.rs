//! Application state.
//!
//! The backend client and the session store are injected collaborators;
//! handlers build a request-scoped [`FlowResolver`] from them.

use std::sync::Arc;

use login_client::IdentityBackend;
use login_flow::FlowResolver;
use login_store::SessionStore;

use crate::config::ServerConfig;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,

    /// Identity backend client.
    pub backend: Arc<dyn IdentityBackend>,

    /// Session cookie store.
    pub store: Arc<dyn SessionStore>,
}

impl AppState {
    /// Creates application state.
    pub fn new(
        config: ServerConfig,
        backend: Arc<dyn IdentityBackend>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            backend,
            store,
        }
    }

    /// Builds a flow resolver over this state's collaborators.
    #[must_use]
    pub fn flow_resolver(&self) -> FlowResolver {
        FlowResolver::new(
            self.backend.clone(),
            self.store.clone(),
            self.config.base_url.clone(),
        )
    }
}
