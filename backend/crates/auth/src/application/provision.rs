//! Administrator Provisioning
//!
//! Creates the first ADMIN account from deployment configuration. Safe to
//! run on every start: an existing account with the same email is left
//! untouched, its password included.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::sign_up::{NewAccount, register_account};
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Administrator account to ensure
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created(UserId),
    AlreadyExists(UserId),
}

/// Ensure an administrator with `seed.email` exists
///
/// An existing identity is reported even if its role is not ADMIN; the
/// mismatch is logged for the operator to resolve.
pub async fn ensure_admin_exists<S>(
    store: &S,
    hasher: &Arc<PasswordHasher>,
    config: &AuthConfig,
    seed: AdminSeed,
) -> AuthResult<ProvisionOutcome>
where
    S: CredentialStore,
{
    let email = Email::new(&seed.email)?;

    if let Some(existing) = store.find_by_email(&email).await? {
        let identity = existing.identity;
        if identity.role != UserRole::Admin {
            tracing::warn!(
                identity_id = %identity.id,
                "Provisioning email belongs to a non-admin account, leaving it unchanged"
            );
        }
        return Ok(ProvisionOutcome::AlreadyExists(identity.id));
    }

    let account = NewAccount {
        email: seed.email,
        display_name: seed.display_name,
        password: seed.password,
        role: UserRole::Admin,
    };

    match register_account(store, hasher, config, account).await {
        Ok(identity) => {
            tracing::info!(identity_id = %identity.id, "Administrator account provisioned");
            Ok(ProvisionOutcome::Created(identity.id))
        }
        // Another instance won the race
        Err(AuthError::EmailTaken) => match store.find_by_email(&email).await? {
            Some(existing) => Ok(ProvisionOutcome::AlreadyExists(existing.identity.id)),
            None => Err(AuthError::EmailTaken),
        },
        Err(e) => Err(e),
    }
}
