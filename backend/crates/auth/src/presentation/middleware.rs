//! Auth Middleware
//!
//! Role gate for protected routes. On success the [`Principal`] is stored
//! in request extensions, where handlers pick it up with the `Principal`
//! extractor.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use platform::cookie::extract_session_token;
use std::sync::Arc;

use crate::application::authorize::{AuthorizationGate, Principal};
use crate::application::config::AuthConfig;
use crate::domain::entity::session::SessionError;
use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthError;

/// Middleware state
pub struct GateState<R>
where
    R: CredentialStore + RevocationStore + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub required: UserRole,
}

impl<R> Clone for GateState<R>
where
    R: CredentialStore + RevocationStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            required: self.required,
        }
    }
}

impl<R> GateState<R>
where
    R: CredentialStore + RevocationStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, required: UserRole) -> Self {
        Self {
            repo,
            config,
            required,
        }
    }
}

/// Middleware that requires a valid session with at least `state.required`
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn require_role<R>(
    State(state): State<GateState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: CredentialStore + RevocationStore + Send + Sync + 'static,
{
    let token = extract_session_token(req.headers(), &state.config.session_cookie_name);

    let gate = AuthorizationGate::new(state.repo.clone(), state.config.clone());
    let principal = gate.authorize(token.as_deref(), state.required).await?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AuthError::Unauthenticated(SessionError::Missing))
    }
}
