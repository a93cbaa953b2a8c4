//! Content Error Types
//!
//! Content-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Content-specific result type alias
pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    /// Missing or malformed request fields
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown kind, id or slug, or not published
    #[error("Content not found")]
    NotFound,

    /// Slug already used by another item of the same kind
    #[error("Slug is already in use")]
    SlugTaken,

    /// Database error
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ContentError::NotFound => StatusCode::NOT_FOUND,
            ContentError::SlugTaken => StatusCode::CONFLICT,
            ContentError::StoreUnavailable(_) | ContentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentError::InvalidInput(_) => ErrorKind::BadRequest,
            ContentError::NotFound => ErrorKind::NotFound,
            ContentError::SlugTaken => ErrorKind::Conflict,
            ContentError::StoreUnavailable(_) | ContentError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        let error = AppError::new(self.kind(), self.to_string());
        match self {
            ContentError::SlugTaken => error.with_action("Choose a different slug"),
            _ => error,
        }
    }

    fn log(&self) {
        match self {
            ContentError::StoreUnavailable(e) => {
                tracing::error!(error = %e, "Content store error");
            }
            ContentError::Internal(msg) => {
                tracing::error!(message = %msg, "Content internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Content error");
            }
        }
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for ContentError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                ContentError::InvalidInput(err.message().to_string())
            }
            ErrorKind::NotFound => ContentError::NotFound,
            _ => ContentError::Internal(err.to_string()),
        }
    }
}
