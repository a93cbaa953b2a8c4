//! Session Entity
//!
//! A session is stateless: everything needed to validate it travels in the
//! signed token. The server only remembers revocations.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

/// Validated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity_id: UserId,
    /// Role at issue time
    pub role: UserRole,
    /// Issue time (Unix ms)
    pub issued_at_ms: i64,
    /// Expiry (Unix ms), always after `issued_at_ms`
    pub expires_at_ms: i64,
    /// Id of the key that signed the token
    pub key_id: String,
}

impl Session {
    #[inline]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    #[inline]
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at_ms - now_ms).max(0)
    }
}

/// Token payload
///
/// Field names are kept short because the payload is sent on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn from_session(session: &Session) -> Self {
        Self {
            sub: *session.identity_id.as_uuid(),
            role: session.role,
            iat: session.issued_at_ms,
            exp: session.expires_at_ms,
        }
    }

    pub fn into_session(self, key_id: &str) -> Session {
        Session {
            identity_id: UserId::from_uuid(self.sub),
            role: self.role,
            issued_at_ms: self.iat,
            expires_at_ms: self.exp,
            key_id: key_id.to_string(),
        }
    }
}

/// Newly issued session with its bearer token
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
}

/// Why a token was not accepted
///
/// Internal only: every variant is reported to clients as the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no session token presented")]
    Missing,

    #[error("session token is malformed")]
    Malformed,

    #[error("session token signed with an unknown or retired key")]
    UnknownKey,

    #[error("session token signature does not verify")]
    TamperedSignature,

    #[error("session has expired")]
    Expired,

    #[error("session has been revoked")]
    Revoked,
}
