//! Identity Administration Use Case
//!
//! ADMIN-only account management. Role changes and deletions revoke every
//! session of the target so the change takes effect immediately.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::authorize::Principal;
use crate::application::config::AuthConfig;
use crate::application::session_issuer::SessionIssuer;
use crate::application::sign_up::{NewAccount, register_account};
use crate::domain::entity::{
    audit::{AuditEvent, AuditSink},
    identity::Identity,
};
use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Identity administration use case
pub struct ManageIdentityUseCase<R>
where
    R: CredentialStore + RevocationStore,
{
    repo: Arc<R>,
    hasher: Arc<PasswordHasher>,
    audit: Arc<dyn AuditSink>,
    config: Arc<AuthConfig>,
}

impl<R> ManageIdentityUseCase<R>
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

    pub async fn list(&self) -> AuthResult<Vec<Identity>> {
        self.repo.list_identities().await
    }

    pub async fn create(&self, actor: &Principal, account: NewAccount) -> AuthResult<Identity> {
        let role = account.role;
        let identity =
            register_account(self.repo.as_ref(), &self.hasher, &self.config, account).await?;

        self.audit.record(AuditEvent::admin_action(
            actor.identity_id.to_string(),
            "create_user",
            serde_json::json!({ "target": identity.id, "role": role }),
        ));
        tracing::info!(
            actor = %actor.identity_id,
            identity_id = %identity.id,
            role = %role,
            "User created by administrator"
        );

        Ok(identity)
    }

    pub async fn change_role(
        &self,
        actor: &Principal,
        target: &UserId,
        role: UserRole,
    ) -> AuthResult<()> {
        if actor.identity_id == *target && role != actor.role {
            return Err(AuthError::InvalidInput(
                "Administrators cannot change their own role".to_string(),
            ));
        }

        if !self.repo.update_role(target, role).await? {
            return Err(AuthError::UserNotFound);
        }
        self.issuer().revoke_all(target).await?;

        self.audit.record(AuditEvent::admin_action(
            actor.identity_id.to_string(),
            "change_role",
            serde_json::json!({ "target": target, "role": role }),
        ));
        tracing::info!(actor = %actor.identity_id, identity_id = %target, role = %role, "Role changed");

        Ok(())
    }

    pub async fn delete(&self, actor: &Principal, target: &UserId) -> AuthResult<()> {
        if actor.identity_id == *target {
            return Err(AuthError::InvalidInput(
                "Administrators cannot delete their own account".to_string(),
            ));
        }

        if !self.repo.delete_identity(target).await? {
            return Err(AuthError::UserNotFound);
        }
        self.issuer().revoke_all(target).await?;

        self.audit.record(AuditEvent::admin_action(
            actor.identity_id.to_string(),
            "delete_user",
            serde_json::json!({ "target": target }),
        ));
        tracing::info!(actor = %actor.identity_id, identity_id = %target, "User deleted");

        Ok(())
    }

    fn issuer(&self) -> SessionIssuer<R> {
        SessionIssuer::new(self.repo.clone(), self.config.clone())
    }
}
