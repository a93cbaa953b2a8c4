//! Change Password Use Case
//!
//! Verifies the current password, then applies the policy to the new one and
//! revokes every session of the identity (including the caller's).

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::session_issuer::SessionIssuer;
use crate::application::sign_up::reject_breached;
use crate::domain::entity::{
    audit::{AuditEvent, AuditOutcome, AuditSink},
    session::SessionError,
};
use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::{
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Change password input
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Change password use case
pub struct ChangePasswordUseCase<R>
where
    R: CredentialStore + RevocationStore,
{
    repo: Arc<R>,
    hasher: Arc<PasswordHasher>,
    audit: Arc<dyn AuditSink>,
    config: Arc<AuthConfig>,
}

impl<R> ChangePasswordUseCase<R>
where
    R: CredentialStore + RevocationStore,
{
    pub fn new(
        repo: Arc<R>,
        hasher: Arc<PasswordHasher>,
        audit: Arc<dyn AuditSink>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            hasher,
            audit,
            config,
        }
    }

    pub async fn execute(&self, identity_id: &UserId, input: ChangePasswordInput) -> AuthResult<()> {
        let mut credential = self
            .repo
            .find_credential(identity_id)
            .await?
            .ok_or(AuthError::Unauthenticated(SessionError::Revoked))?;

        let current = RawPassword::for_verification(input.current_password).ok();
        let stored = credential.password_hash.clone();
        let hasher = self.hasher.clone();

        let verified = tokio::task::spawn_blocking(move || match &current {
            Some(current) => stored.verify(&hasher, current),
            None => {
                hasher.verify_decoy(None);
                false
            }
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task failed: {e}")))?;

        if !verified {
            self.audit.record(
                AuditEvent::admin_action(
                    identity_id.to_string(),
                    "change_password",
                    serde_json::Value::Null,
                )
                .with_outcome(AuditOutcome::Failure),
            );
            return Err(AuthError::InvalidCredentials);
        }

        // Policy and breach lookup only once the caller proved the current password
        let new_password = RawPassword::new(input.new_password)?;
        if self.config.check_breached_passwords {
            reject_breached(&new_password).await?;
        }

        let hasher = self.hasher.clone();
        let new_hash = tokio::task::spawn_blocking(move || UserPassword::hash(&hasher, &new_password))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {e}")))??;

        credential.update_password(new_hash);
        self.repo.update_credential(&credential).await?;

        SessionIssuer::new(self.repo.clone(), self.config.clone())
            .revoke_all(identity_id)
            .await?;

        self.audit.record(AuditEvent::admin_action(
            identity_id.to_string(),
            "change_password",
            serde_json::Value::Null,
        ));
        tracing::info!(identity_id = %identity_id, "Password changed");

        Ok(())
    }
}
