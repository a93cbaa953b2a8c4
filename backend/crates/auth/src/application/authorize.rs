//! Authorization Gate
//!
//! Decides whether a request may proceed: the token must validate and the
//! role carried by the session (or, in resolving mode, the identity's
//! current role) must satisfy the required role.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_issuer::SessionIssuer;
use crate::domain::entity::session::{Session, SessionError};
use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Authenticated caller of a gated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identity_id: UserId,
    pub role: UserRole,
    pub session: Session,
}

/// Authorization gate
pub struct AuthorizationGate<R>
where
    R: CredentialStore + RevocationStore,
{
    repo: Arc<R>,
    issuer: SessionIssuer<R>,
    resolve_identity: bool,
}

impl<R> AuthorizationGate<R>
where
    R: CredentialStore + RevocationStore,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        let resolve_identity = config.resolve_identity;
        Self {
            issuer: SessionIssuer::new(repo.clone(), config),
            repo,
            resolve_identity,
        }
    }

    /// Authenticate the token and check the role
    ///
    /// `Unauthenticated` for any token problem, `Forbidden` when the role
    /// is insufficient.
    pub async fn authorize(
        &self,
        token: Option<&str>,
        required: UserRole,
    ) -> AuthResult<Principal> {
        let token = token.ok_or(SessionError::Missing)?;
        let session = self.issuer.validate(token).await?;
        self.check(session, required).await
    }

    /// Same as [`authorize`](Self::authorize) as of `now_ms`
    pub async fn authorize_at(
        &self,
        token: Option<&str>,
        required: UserRole,
        now_ms: i64,
    ) -> AuthResult<Principal> {
        let token = token.ok_or(SessionError::Missing)?;
        let session = self.issuer.validate_at(token, now_ms).await?;
        self.check(session, required).await
    }

    async fn check(&self, session: Session, required: UserRole) -> AuthResult<Principal> {
        let role = if self.resolve_identity {
            match self.repo.find_identity(&session.identity_id).await? {
                Some(identity) => identity.role,
                None => return Err(SessionError::Revoked.into()),
            }
        } else {
            session.role
        };

        if !role.satisfies(required) {
            tracing::info!(
                identity_id = %session.identity_id,
                role = %role,
                required = %required,
                "Insufficient role"
            );
            return Err(AuthError::Forbidden);
        }

        Ok(Principal {
            identity_id: session.identity_id,
            role,
            session,
        })
    }
}
