//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Messages are written for clients. Anything that would tell an attacker
//! which part of a credential was wrong stays in the logs.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordPolicyError;
use thiserror::Error;

use crate::domain::entity::session::SessionError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed request fields
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown email or wrong password (indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No valid session; the reason is logged only
    #[error("Authentication required")]
    Unauthenticated(SessionError),

    /// Valid session, insufficient role
    #[error("Insufficient permissions")]
    Forbidden,

    /// Normalized email already registered
    #[error("Email is already registered")]
    EmailTaken,

    /// New password rejected by policy
    #[error("{0}")]
    PasswordPolicy(#[from] PasswordPolicyError),

    /// Identity not found (admin paths only)
    #[error("User not found")]
    UserNotFound,

    /// Self-service registration is turned off
    #[error("Sign-up is disabled")]
    SignUpDisabled,

    /// Too many sign-in attempts from one source
    #[error("Too many sign-in attempts")]
    RateLimited { retry_after_secs: u64 },

    /// Database error
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) | AuthError::PasswordPolicy(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden | AuthError::SignUpDisabled => StatusCode::FORBIDDEN,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_) | AuthError::PasswordPolicy(_) => ErrorKind::BadRequest,
            AuthError::InvalidCredentials | AuthError::Unauthenticated(_) => {
                ErrorKind::Unauthorized
            }
            AuthError::Forbidden | AuthError::SignUpDisabled => ErrorKind::Forbidden,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let error = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::PasswordPolicy(_) => {
                error.with_action("Please choose a different password")
            }
            AuthError::RateLimited { .. } => error.with_action("Please wait and try again"),
            _ => error,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::StoreUnavailable(e) => {
                tracing::error!(error = %e, "Auth store error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Unauthenticated(reason @ SessionError::TamperedSignature) => {
                tracing::warn!(reason = %reason, "Rejected session token");
            }
            AuthError::Unauthenticated(reason) => {
                tracing::debug!(reason = %reason, "Rejected session token");
            }
            AuthError::RateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Sign-in rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let mut response = self.to_app_error().into_response();
        if let AuthError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                AuthError::InvalidInput(err.message().to_string())
            }
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        AuthError::Unauthenticated(err)
    }
}
