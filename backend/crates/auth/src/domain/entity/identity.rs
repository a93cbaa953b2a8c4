//! Identity Entity
//!
//! An account that can sign in. Credentials live in
//! [`StoredCredential`](super::credential::StoredCredential) so that loading
//! an identity for display never touches the password hash.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    display_name::DisplayName, email::Email, user_id::UserId, user_role::UserRole,
};

/// Identity entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Immutable UUID v4 identifier
    pub id: UserId,
    /// Normalized login email (unique)
    pub email: Email,
    pub display_name: DisplayName,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(email: Email, display_name: DisplayName, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            display_name,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

/// Identity whose credentials were just verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub id: UserId,
    pub role: UserRole,
    pub display_name: DisplayName,
}

impl From<&Identity> for VerifiedIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            role: identity.role,
            display_name: identity.display_name.clone(),
        }
    }
}
