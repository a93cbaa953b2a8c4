//! Session Issuer
//!
//! Issues and validates stateless session tokens.
//!
//! ## Token format
//! `kid.base64url(payload).base64url(HMAC-SHA256(key[kid], "kid.payload"))`
//!
//! The payload is the JSON form of [`SessionClaims`]. Timestamps are Unix
//! milliseconds. A token is valid when the key id is in the keyring, the
//! signature verifies over the untouched `kid.payload` prefix, `now < exp`,
//! and the deny-list does not cover it.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::{from_base64url, hmac_sha256, hmac_sha256_verify, to_base64url};

use crate::application::config::AuthConfig;
use crate::domain::entity::{
    identity::VerifiedIdentity,
    session::{IssuedSession, Session, SessionClaims, SessionError},
};
use crate::domain::repository::RevocationStore;
use crate::domain::value_object::{signing_key::SigningKey, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Session issuer
pub struct SessionIssuer<R>
where
    R: RevocationStore,
{
    revocations: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> SessionIssuer<R>
where
    R: RevocationStore,
{
    pub fn new(revocations: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            revocations,
            config,
        }
    }

    /// Issue a session for a verified identity
    pub async fn issue(&self, identity: &VerifiedIdentity) -> AuthResult<IssuedSession> {
        self.issue_at(identity.id, identity.role, now_ms()).await
    }

    /// Issue a session as of `now_ms`
    ///
    /// If the identity has a revocation watermark at or after `now_ms` the
    /// issue time is moved just past it, so a session created right after a
    /// "revoke all" is not caught by it.
    pub async fn issue_at(
        &self,
        identity_id: UserId,
        role: UserRole,
        now_ms: i64,
    ) -> AuthResult<IssuedSession> {
        let issued_at_ms = match self.revocations.watermark(&identity_id).await? {
            Some(watermark) if watermark >= now_ms => watermark.saturating_add(1),
            _ => now_ms,
        };

        let expires_at_ms = issued_at_ms
            .checked_add(self.config.session_ttl_ms().max(1))
            .ok_or_else(|| {
                AuthError::Internal("Session lifetime overflows the clock".to_string())
            })?;

        let key = self.config.keyring.current();
        let session = Session {
            identity_id,
            role,
            issued_at_ms,
            expires_at_ms,
            key_id: key.id().to_string(),
        };

        let token = sign(key, &SessionClaims::from_session(&session))?;

        tracing::debug!(
            identity_id = %session.identity_id,
            key_id = %session.key_id,
            expires_at_ms = session.expires_at_ms,
            "Session issued"
        );

        Ok(IssuedSession { token, session })
    }

    /// Validate a token against the keyring, the clock and the deny-list
    pub async fn validate(&self, token: &str) -> AuthResult<Session> {
        self.validate_at(token, now_ms()).await
    }

    /// Validate a token as of `now_ms`
    pub async fn validate_at(&self, token: &str, now_ms: i64) -> AuthResult<Session> {
        let session = self.decode(token)?;

        if session.is_expired_at(now_ms) {
            return Err(SessionError::Expired.into());
        }

        if self
            .revocations
            .is_revoked(&session.identity_id, session.issued_at_ms)
            .await?
        {
            return Err(SessionError::Revoked.into());
        }

        Ok(session)
    }

    /// Check format and signature only (no clock, no deny-list)
    pub fn decode(&self, token: &str) -> Result<Session, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::Missing);
        }

        let mut parts = token.split('.');
        let (Some(key_id), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SessionError::Malformed);
        };

        if key_id.is_empty() || payload_b64.is_empty() || signature_b64.is_empty() {
            return Err(SessionError::Malformed);
        }

        let key = self
            .config
            .keyring
            .get(key_id)
            .ok_or(SessionError::UnknownKey)?;

        let signature = from_base64url(signature_b64).map_err(|_| SessionError::Malformed)?;
        let signing_input = &token[..key_id.len() + 1 + payload_b64.len()];

        if !hmac_sha256_verify(key.secret(), signing_input.as_bytes(), &signature) {
            return Err(SessionError::TamperedSignature);
        }

        let payload = from_base64url(payload_b64).map_err(|_| SessionError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| SessionError::Malformed)?;

        if claims.exp <= claims.iat {
            return Err(SessionError::Malformed);
        }

        Ok(claims.into_session(key_id))
    }

    /// Revoke one session (sign-out)
    pub async fn revoke(&self, session: &Session) -> AuthResult<()> {
        self.revocations
            .revoke_session(
                &session.identity_id,
                session.issued_at_ms,
                session.expires_at_ms,
            )
            .await
    }

    /// Revoke every session of an identity issued up to now
    pub async fn revoke_all(&self, identity_id: &UserId) -> AuthResult<()> {
        self.revoke_all_at(identity_id, now_ms()).await
    }

    pub async fn revoke_all_at(&self, identity_id: &UserId, now_ms: i64) -> AuthResult<()> {
        let retain_until_ms = now_ms.saturating_add(self.config.session_ttl_ms());
        self.revocations
            .revoke_all(identity_id, now_ms, retain_until_ms)
            .await?;

        tracing::info!(identity_id = %identity_id, "All sessions revoked");
        Ok(())
    }
}

fn sign(key: &SigningKey, claims: &SessionClaims) -> AuthResult<String> {
    let payload = serde_json::to_vec(claims)
        .map_err(|e| AuthError::Internal(format!("Session encoding failed: {e}")))?;

    let signing_input = format!("{}.{}", key.id(), to_base64url(&payload));
    let signature = hmac_sha256(key.secret(), signing_input.as_bytes());

    Ok(format!("{}.{}", signing_input, to_base64url(&signature)))
}

pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
