//! Organization model.

use serde::{Deserialize, Serialize};

/// An organization (tenant) at the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Primary domain, used for domain discovery.
    pub primary_domain: Option<String>,
}

impl Organization {
    /// Creates an organization without a primary domain.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            primary_domain: None,
        }
    }

    /// Sets the primary domain.
    #[must_use]
    pub fn with_primary_domain(mut self, domain: impl Into<String>) -> Self {
        self.primary_domain = Some(domain.into());
        self
    }
}
