//! User account model.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
    /// Account created but setup never completed; cannot log in yet.
    Initial,
    /// Active account.
    #[default]
    Active,
    /// Deactivated by an administrator.
    Inactive,
    /// Locked after repeated failures.
    Locked,
    /// Scheduled for deletion.
    Deleted,
}

/// An email address with its verification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// The address.
    pub address: String,
    /// Whether the address has been verified.
    pub is_verified: bool,
}

/// A phone number with its verification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    /// The number, E.164.
    pub number: String,
    /// Whether the number has been verified.
    pub is_verified: bool,
}

/// A user account as reported by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// User id.
    pub id: String,
    /// Lifecycle state.
    pub state: UserState,
    /// The login name preferred for display and cookie records.
    pub preferred_login_name: String,
    /// Organization the account belongs to.
    pub organization_id: String,
    /// Email, if set.
    pub email: Option<Email>,
    /// Phone, if set.
    pub phone: Option<Phone>,
    /// Whether the user must change the password on next login.
    pub password_change_required: bool,
}

impl UserAccount {
    /// Creates an active account with no contact details.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        preferred_login_name: impl Into<String>,
        organization_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            state: UserState::Active,
            preferred_login_name: preferred_login_name.into(),
            organization_id: organization_id.into(),
            email: None,
            phone: None,
            password_change_required: false,
        }
    }

    /// Sets the account state.
    #[must_use]
    pub const fn with_state(mut self, state: UserState) -> Self {
        self.state = state;
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, address: impl Into<String>, is_verified: bool) -> Self {
        self.email = Some(Email {
            address: address.into(),
            is_verified,
        });
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, number: impl Into<String>, is_verified: bool) -> Self {
        self.phone = Some(Phone {
            number: number.into(),
            is_verified,
        });
        self
    }
}
