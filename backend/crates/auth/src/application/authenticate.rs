//! Authenticator
//!
//! The single credential check used by every sign-in path.
//!
//! Unknown email, unparsable email, oversized password and wrong password
//! all end in the same [`AuthError::InvalidCredentials`] after one full
//! Argon2 verification, so neither the response nor its timing tells them
//! apart.

use std::net::IpAddr;
use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::domain::entity::{
    audit::{AuditEvent, AuditOutcome, AuditSink},
    credential::CredentialRecord,
    identity::VerifiedIdentity,
};
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Authenticator
pub struct Authenticator<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    hasher: Arc<PasswordHasher>,
    audit: Arc<dyn AuditSink>,
}

enum Verification {
    Matched {
        record: CredentialRecord,
        password: RawPassword,
        needs_rehash: bool,
    },
    Rejected,
}

impl<S> Authenticator<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>, hasher: Arc<PasswordHasher>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            hasher,
            audit,
        }
    }

    /// Check an email/password pair
    ///
    /// Store failures propagate as errors; every credential problem is
    /// `InvalidCredentials`.
    pub async fn authenticate(
        &self,
        email: &str,
        password: String,
        source: Option<IpAddr>,
    ) -> AuthResult<VerifiedIdentity> {
        let email = Email::new(email).ok();
        let password = RawPassword::for_verification(password).ok();

        let record = match &email {
            Some(email) => self.store.find_by_email(email).await?,
            None => None,
        };

        let hasher = self.hasher.clone();
        let verification = tokio::task::spawn_blocking(move || verify(&hasher, record, password))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task failed: {e}")))?;

        match verification {
            Verification::Matched {
                record,
                password,
                needs_rehash,
            } => {
                if needs_rehash {
                    self.upgrade_hash(record.clone(), password).await;
                }

                let identity = VerifiedIdentity::from(&record.identity);
                self.audit.record(AuditEvent::auth_attempt(
                    identity.id.to_string(),
                    AuditOutcome::Success,
                    source,
                ));
                tracing::info!(identity_id = %identity.id, role = %identity.role, "Credentials verified");

                Ok(identity)
            }
            Verification::Rejected => {
                let actor = email
                    .as_ref()
                    .map(|e| e.as_str().to_string())
                    .unwrap_or_else(|| "<invalid email>".to_string());
                self.audit
                    .record(AuditEvent::auth_attempt(actor, AuditOutcome::Failure, source));

                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Re-hash with the current parameters after a successful login
    ///
    /// Failures are logged; the login itself already succeeded.
    async fn upgrade_hash(&self, record: CredentialRecord, password: RawPassword) {
        let hasher = self.hasher.clone();
        let mut credential = record.credential;

        let rehashed =
            tokio::task::spawn_blocking(move || UserPassword::hash(&hasher, &password)).await;

        let new_hash = match rehashed {
            Ok(Ok(hash)) => hash,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Password rehash failed");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Password rehash task failed");
                return;
            }
        };

        credential.update_password(new_hash);
        match self.store.update_credential(&credential).await {
            Ok(()) => tracing::info!(
                identity_id = %credential.identity_id,
                "Password hash upgraded to current parameters"
            ),
            Err(e) => tracing::warn!(error = %e, "Storing upgraded password hash failed"),
        }
    }
}

fn verify(
    hasher: &PasswordHasher,
    record: Option<CredentialRecord>,
    password: Option<RawPassword>,
) -> Verification {
    match (record, password) {
        (Some(record), Some(password)) => {
            let stored = &record.credential.password_hash;
            if stored.verify(hasher, &password) {
                let needs_rehash = stored.needs_rehash(hasher);
                Verification::Matched {
                    record,
                    password,
                    needs_rehash,
                }
            } else {
                Verification::Rejected
            }
        }
        (_, password) => {
            // Same cost as a real mismatch
            hasher.verify_decoy(password.as_ref().map(RawPassword::inner));
            Verification::Rejected
        }
    }
}
