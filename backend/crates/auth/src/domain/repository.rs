//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{
    credential::{CredentialRecord, StoredCredential},
    identity::Identity,
};
use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole};
use crate::error::AuthResult;

/// Identities and their password credentials
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Find identity and credential by normalized email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<CredentialRecord>>;

    /// Find identity by ID
    async fn find_identity(&self, id: &UserId) -> AuthResult<Option<Identity>>;

    /// Find credential by identity ID
    async fn find_credential(&self, id: &UserId) -> AuthResult<Option<StoredCredential>>;

    /// Insert a new identity with its credential
    ///
    /// Fails with `EmailTaken` when the normalized email exists.
    async fn insert_identity(
        &self,
        identity: &Identity,
        credential: &StoredCredential,
    ) -> AuthResult<()>;

    /// Replace the password hash of an existing identity
    async fn update_credential(&self, credential: &StoredCredential) -> AuthResult<()>;

    /// Change the role of an identity, returns false when it does not exist
    async fn update_role(&self, id: &UserId, role: UserRole) -> AuthResult<bool>;

    /// Delete an identity and its credential, returns false when it does not exist
    async fn delete_identity(&self, id: &UserId) -> AuthResult<bool>;

    /// All identities, oldest first
    async fn list_identities(&self) -> AuthResult<Vec<Identity>>;
}

/// Deny-list of revoked sessions
///
/// Two kinds of entries:
/// - a single session, keyed by `(identity, issued_at)`
/// - a per-identity watermark: every session issued at or before it is revoked
///
/// Each entry carries a retention deadline after which no token it could
/// match is still unexpired, so it can be purged.
#[trait_variant::make(RevocationStore: Send)]
pub trait LocalRevocationStore {
    /// Revoke one session
    async fn revoke_session(
        &self,
        id: &UserId,
        issued_at_ms: i64,
        retain_until_ms: i64,
    ) -> AuthResult<()>;

    /// Revoke every session of `id` issued at or before `issued_before_ms`
    ///
    /// An existing later watermark is kept.
    async fn revoke_all(
        &self,
        id: &UserId,
        issued_before_ms: i64,
        retain_until_ms: i64,
    ) -> AuthResult<()>;

    /// Current watermark of `id`, if any
    async fn watermark(&self, id: &UserId) -> AuthResult<Option<i64>>;

    /// Whether the session `(id, issued_at_ms)` is revoked
    async fn is_revoked(&self, id: &UserId, issued_at_ms: i64) -> AuthResult<bool>;

    /// Drop entries whose retention has passed
    async fn purge_expired(&self, now_ms: i64) -> AuthResult<u64>;
}
