//! Sign In Use Case
//!
//! Verifies credentials and issues a session.

use std::net::IpAddr;
use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::authenticate::Authenticator;
use crate::application::config::AuthConfig;
use crate::application::session_issuer::SessionIssuer;
use crate::domain::entity::{audit::AuditSink, session::IssuedSession};
use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::display_name::DisplayName;
use crate::error::AuthResult;

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
    pub source: Option<IpAddr>,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub issued: IssuedSession,
    pub display_name: DisplayName,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: CredentialStore + RevocationStore,
{
    authenticator: Authenticator<R>,
    issuer: SessionIssuer<R>,
}

impl<R> SignInUseCase<R>
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
            authenticator: Authenticator::new(repo.clone(), hasher, audit),
            issuer: SessionIssuer::new(repo, config),
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let identity = self
            .authenticator
            .authenticate(&input.email, input.password, input.source)
            .await?;

        let issued = self.issuer.issue(&identity).await?;

        tracing::info!(
            identity_id = %identity.id,
            expires_at_ms = issued.session.expires_at_ms,
            "User signed in"
        );

        Ok(SignInOutput {
            issued,
            display_name: identity.display_name,
        })
    }
}
