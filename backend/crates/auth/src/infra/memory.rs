//! In-Memory Repository Implementations
//!
//! Used by tests and by local runs without a database. State is shared
//! between clones.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;

use crate::domain::entity::{
    audit::{AuditEvent, AuditSink},
    credential::{CredentialRecord, StoredCredential},
    identity::Identity,
};
use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    identities: HashMap<UserId, Identity>,
    credentials: HashMap<UserId, StoredCredential>,
    by_email: HashMap<String, UserId>,
    /// `(identity, issued_at_ms)` -> retain until
    revoked_sessions: HashMap<(UserId, i64), i64>,
    /// identity -> (issued_before_ms, retain until)
    watermarks: HashMap<UserId, (i64, i64)>,
}

/// In-memory auth repository
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<RwLock<State>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `StoreUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of deny-list entries (single sessions plus watermarks)
    pub async fn revocation_count(&self) -> usize {
        let state = self.state.read().await;
        state.revoked_sessions.len() + state.watermarks.len()
    }

    fn check_available(&self) -> AuthResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::StoreUnavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl CredentialStore for MemoryAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<CredentialRecord>> {
        self.check_available()?;
        let state = self.state.read().await;

        let Some(id) = state.by_email.get(email.as_str()) else {
            return Ok(None);
        };

        let record = match (state.identities.get(id), state.credentials.get(id)) {
            (Some(identity), Some(credential)) => Some(CredentialRecord {
                identity: identity.clone(),
                credential: credential.clone(),
            }),
            _ => None,
        };
        Ok(record)
    }

    async fn find_identity(&self, id: &UserId) -> AuthResult<Option<Identity>> {
        self.check_available()?;
        Ok(self.state.read().await.identities.get(id).cloned())
    }

    async fn find_credential(&self, id: &UserId) -> AuthResult<Option<StoredCredential>> {
        self.check_available()?;
        Ok(self.state.read().await.credentials.get(id).cloned())
    }

    async fn insert_identity(
        &self,
        identity: &Identity,
        credential: &StoredCredential,
    ) -> AuthResult<()> {
        self.check_available()?;
        let mut state = self.state.write().await;

        if state.by_email.contains_key(identity.email.as_str()) {
            return Err(AuthError::EmailTaken);
        }

        state
            .by_email
            .insert(identity.email.as_str().to_string(), identity.id);
        state.identities.insert(identity.id, identity.clone());
        state.credentials.insert(identity.id, credential.clone());
        Ok(())
    }

    async fn update_credential(&self, credential: &StoredCredential) -> AuthResult<()> {
        self.check_available()?;
        let mut state = self.state.write().await;

        if let Some(existing) = state.credentials.get_mut(&credential.identity_id) {
            *existing = credential.clone();
        }
        Ok(())
    }

    async fn update_role(&self, id: &UserId, role: UserRole) -> AuthResult<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;

        match state.identities.get_mut(id) {
            Some(identity) => {
                identity.set_role(role);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_identity(&self, id: &UserId) -> AuthResult<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let Some(identity) = state.identities.remove(id) else {
            return Ok(false);
        };
        state.credentials.remove(id);
        state.by_email.remove(identity.email.as_str());
        Ok(true)
    }

    async fn list_identities(&self) -> AuthResult<Vec<Identity>> {
        self.check_available()?;
        let state = self.state.read().await;

        let mut identities: Vec<Identity> = state.identities.values().cloned().collect();
        identities.sort_by_key(|i| i.created_at);
        Ok(identities)
    }
}

impl RevocationStore for MemoryAuthRepository {
    async fn revoke_session(
        &self,
        id: &UserId,
        issued_at_ms: i64,
        retain_until_ms: i64,
    ) -> AuthResult<()> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let entry = state
            .revoked_sessions
            .entry((*id, issued_at_ms))
            .or_insert(retain_until_ms);
        *entry = (*entry).max(retain_until_ms);
        Ok(())
    }

    async fn revoke_all(
        &self,
        id: &UserId,
        issued_before_ms: i64,
        retain_until_ms: i64,
    ) -> AuthResult<()> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let entry = state
            .watermarks
            .entry(*id)
            .or_insert((issued_before_ms, retain_until_ms));
        entry.0 = entry.0.max(issued_before_ms);
        entry.1 = entry.1.max(retain_until_ms);
        Ok(())
    }

    async fn watermark(&self, id: &UserId) -> AuthResult<Option<i64>> {
        self.check_available()?;
        Ok(self
            .state
            .read()
            .await
            .watermarks
            .get(id)
            .map(|(before, _)| *before))
    }

    async fn is_revoked(&self, id: &UserId, issued_at_ms: i64) -> AuthResult<bool> {
        self.check_available()?;
        let state = self.state.read().await;

        if state.revoked_sessions.contains_key(&(*id, issued_at_ms)) {
            return Ok(true);
        }
        Ok(state
            .watermarks
            .get(id)
            .is_some_and(|(before, _)| issued_at_ms <= *before))
    }

    async fn purge_expired(&self, now_ms: i64) -> AuthResult<u64> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let before = state.revoked_sessions.len() + state.watermarks.len();
        state
            .revoked_sessions
            .retain(|_, retain_until| *retain_until >= now_ms);
        state
            .watermarks
            .retain(|_, (_, retain_until)| *retain_until >= now_ms);
        let after = state.revoked_sessions.len() + state.watermarks.len();

        Ok((before - after) as u64)
    }
}

/// Audit sink that keeps events in memory
#[derive(Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
