//! Credential Entity
//!
//! Password hash of an identity, one-to-one with [`Identity`].

use chrono::{DateTime, Utc};

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::{user_id::UserId, user_password::UserPassword};

/// Stored password credential
///
/// `Debug` and `Display` of the hash are redacted.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub identity_id: UserId,
    pub password_hash: UserPassword,
    pub updated_at: DateTime<Utc>,
}

impl StoredCredential {
    pub fn new(identity_id: UserId, password_hash: UserPassword) -> Self {
        Self {
            identity_id,
            password_hash,
            updated_at: Utc::now(),
        }
    }

    /// Replace the hash (password change or parameter upgrade)
    pub fn update_password(&mut self, password_hash: UserPassword) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}

/// Identity together with its credential, as returned by email lookup
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub identity: Identity,
    pub credential: StoredCredential,
}
