//! Sign Up Use Case
//!
//! Creates a new USER account when self-service registration is enabled.
//! [`register_account`] is the one place accounts are created; the admin
//! and provisioning paths reuse it.

use std::sync::Arc;

use platform::password::{PasswordHasher, PasswordPolicyError};

use crate::application::config::AuthConfig;
use crate::domain::entity::{credential::StoredCredential, identity::Identity};
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    display_name::DisplayName,
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Account to create
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub role: UserRole,
}

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    hasher: Arc<PasswordHasher>,
    config: Arc<AuthConfig>,
}

impl<S> SignUpUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>, hasher: Arc<PasswordHasher>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            hasher,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<Identity> {
        if !self.config.allow_sign_up {
            return Err(AuthError::SignUpDisabled);
        }

        let identity = register_account(
            self.store.as_ref(),
            &self.hasher,
            &self.config,
            NewAccount {
                email: input.email,
                display_name: input.display_name,
                password: input.password,
                role: UserRole::User,
            },
        )
        .await?;

        tracing::info!(identity_id = %identity.id, "User signed up");
        Ok(identity)
    }
}

/// Validate, hash and insert a new account
pub(crate) async fn register_account<S>(
    store: &S,
    hasher: &Arc<PasswordHasher>,
    config: &AuthConfig,
    account: NewAccount,
) -> AuthResult<Identity>
where
    S: CredentialStore,
{
    let email = Email::new(&account.email)?;
    let display_name = DisplayName::new(&account.display_name)
        .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
    let password = RawPassword::new(account.password)?;

    if config.check_breached_passwords {
        reject_breached(&password).await?;
    }

    let hasher = hasher.clone();
    let password_hash = tokio::task::spawn_blocking(move || UserPassword::hash(&hasher, &password))
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {e}")))??;

    let identity = Identity::new(email, display_name, account.role);
    let credential = StoredCredential::new(identity.id, password_hash);

    store.insert_identity(&identity, &credential).await?;
    Ok(identity)
}

/// Fail closed on a confirmed breach, open on an unreachable API
pub(crate) async fn reject_breached(password: &RawPassword) -> AuthResult<()> {
    match password.is_compromised().await {
        Ok(true) => Err(PasswordPolicyError::Compromised.into()),
        Ok(false) => Ok(()),
        Err(e) => {
            tracing::warn!(error = %e, "Breach check unavailable, accepting password");
            Ok(())
        }
    }
}
