//! Sign Out Use Case
//!
//! Puts the presented session on the deny-list.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_issuer::SessionIssuer;
use crate::domain::repository::RevocationStore;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<R>
where
    R: RevocationStore,
{
    issuer: SessionIssuer<R>,
}

impl<R> SignOutUseCase<R>
where
    R: RevocationStore,
{
    pub fn new(revocations: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            issuer: SessionIssuer::new(revocations, config),
        }
    }

    /// Sign out from current session
    ///
    /// The token must still be valid; the same token is rejected afterwards.
    pub async fn execute(&self, session_token: &str) -> AuthResult<()> {
        let session = self.issuer.validate(session_token).await?;
        self.issuer.revoke(&session).await?;

        tracing::info!(identity_id = %session.identity_id, "User signed out");
        Ok(())
    }

    /// Sign out from every session of the token's owner
    pub async fn execute_all(&self, session_token: &str) -> AuthResult<()> {
        let session = self.issuer.validate(session_token).await?;
        self.issuer.revoke_all(&session.identity_id).await?;

        tracing::info!(identity_id = %session.identity_id, "User signed out everywhere");
        Ok(())
    }
}
