//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::client::ClientAddr;
use platform::cookie::{delete_cookie_header, extract_session_token, set_cookie_header};
use platform::password::PasswordHasher;
use platform::rate_limit::{MemoryRateLimitStore, RateLimitStore, now_ms};

use crate::application::config::AuthConfig;
use crate::application::{
    ChangePasswordInput, ChangePasswordUseCase, ManageIdentityUseCase, NewAccount, Principal,
    SessionIssuer, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::entity::audit::AuditSink;
use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangePasswordRequest, ChangeRoleRequest, CreateUserRequest, SessionStatusResponse,
    SignInRequest, SignInResponse, SignUpRequest, UserListResponse, UserResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub hasher: Arc<PasswordHasher>,
    pub audit: Arc<dyn AuditSink>,
    pub sign_in_limiter: Arc<MemoryRateLimitStore>,
}

impl<R> AuthAppState<R>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    /// Build the state, deriving the password hasher from `config`
    pub fn new(repo: R, config: AuthConfig, audit: Arc<dyn AuditSink>) -> AuthResult<Self> {
        let hasher = PasswordHasher::new(config.hash_params, config.password_pepper.clone())
            .map_err(|e| AuthError::Internal(format!("Password hasher setup failed: {e}")))?;

        Ok(Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            hasher: Arc::new(hasher),
            audit,
            sign_in_limiter: Arc::new(MemoryRateLimitStore::new()),
        })
    }

    fn session_token(&self, headers: &HeaderMap) -> Option<String> {
        extract_session_token(headers, &self.config.session_cookie_name)
    }
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    client: ClientAddr,
    headers: HeaderMap,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let client = client.behind_proxy(&headers, state.config.trust_forwarded_for);

    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable sign-in body");
            SignInRequest::default()
        }
    };

    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AuthError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    let limit = state
        .sign_in_limiter
        .check_and_increment(&client.key(), &state.config.sign_in_rate_limit)
        .await
        .map_err(|e| AuthError::Internal(format!("Rate limit check failed: {e}")))?;

    if !limit.allowed {
        return Err(AuthError::RateLimited {
            retry_after_secs: limit.retry_after_secs(now_ms()),
        });
    }

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.audit.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
            source: client.0,
        })
        .await?;

    let cookie = set_cookie_header(&state.config.session_cookie(), &output.issued.token);
    let session = output.issued.session;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse {
            token: output.issued.token,
            expires_at_ms: session.expires_at_ms,
            role: session.role,
            display_name: output.display_name.as_str().to_string(),
        }),
    ))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/signout
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let token = state.session_token(&headers).unwrap_or_default();

    SignOutUseCase::new(state.repo.clone(), state.config.clone())
        .execute(&token)
        .await?;

    let cookie = delete_cookie_header(&state.config.session_cookie());
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

/// POST /api/auth/signout/all
pub async fn sign_out_all<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let token = state.session_token(&headers).unwrap_or_default();

    SignOutUseCase::new(state.repo.clone(), state.config.clone())
        .execute_all(&token)
        .await?;

    let cookie = delete_cookie_header(&state.config.session_cookie());
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/session
///
/// Never rejects an invalid token; store failures still surface.
pub async fn session_status<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Json<SessionStatusResponse>>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let Some(token) = state.session_token(&headers) else {
        return Ok(Json(SessionStatusResponse::anonymous()));
    };

    let issuer = SessionIssuer::new(state.repo.clone(), state.config.clone());

    match issuer.validate(&token).await {
        Ok(session) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            identity_id: Some(session.identity_id),
            role: Some(session.role),
            expires_at_ms: Some(session.expires_at_ms),
        })),
        Err(AuthError::Unauthenticated(reason)) => {
            tracing::debug!(reason = %reason, "Session status for invalid token");
            Ok(Json(SessionStatusResponse::anonymous()))
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let req = json_body(body)?;

    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.config.clone(),
    );

    let identity = use_case
        .execute(SignUpInput {
            email: req.email,
            display_name: req.display_name,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(identity))))
}

// ============================================================================
// Password Change (requires USER)
// ============================================================================

/// POST /api/auth/password
///
/// Every session of the caller, this one included, is revoked.
pub async fn change_password<R>(
    State(state): State<AuthAppState<R>>,
    principal: Principal,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let req = json_body(body)?;

    let use_case = ChangePasswordUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.audit.clone(),
        state.config.clone(),
    );

    use_case
        .execute(
            &principal.identity_id,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    let cookie = delete_cookie_header(&state.config.session_cookie());
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// User Administration (requires ADMIN)
// ============================================================================

/// GET /api/auth/users
pub async fn list_users<R>(
    State(state): State<AuthAppState<R>>,
) -> AuthResult<Json<UserListResponse>>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let users = manage(&state).list().await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/auth/users
pub async fn create_user<R>(
    State(state): State<AuthAppState<R>>,
    principal: Principal,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let req = json_body(body)?;

    let identity = manage(&state)
        .create(
            &principal,
            NewAccount {
                email: req.email,
                display_name: req.display_name,
                password: req.password,
                role: req.role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(identity))))
}

/// PATCH /api/auth/users/{id}/role
pub async fn change_role<R>(
    State(state): State<AuthAppState<R>>,
    principal: Principal,
    Path(id): Path<String>,
    body: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> AuthResult<StatusCode>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let target = parse_user_id(&id)?;
    let req = json_body(body)?;

    manage(&state)
        .change_role(&principal, &target, req.role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/auth/users/{id}
pub async fn delete_user<R>(
    State(state): State<AuthAppState<R>>,
    principal: Principal,
    Path(id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let target = parse_user_id(&id)?;

    manage(&state).delete(&principal, &target).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn manage<R>(state: &AuthAppState<R>) -> ManageIdentityUseCase<R>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    ManageIdentityUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.audit.clone(),
        state.config.clone(),
    )
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AuthResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AuthError::InvalidInput(rejection.body_text()))
}

fn parse_user_id(raw: &str) -> AuthResult<UserId> {
    raw.parse()
        .map_err(|_| AuthError::InvalidInput("Invalid user id".to_string()))
}
