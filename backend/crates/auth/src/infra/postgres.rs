//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    credential::{CredentialRecord, StoredCredential},
    identity::Identity,
};
use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, user_id::UserId, user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Drop deny-list entries that can no longer match an unexpired token
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = self.purge_expired(Utc::now().timestamp_millis()).await?;

        tracing::info!(revocations_deleted = deleted, "Cleaned up expired session revocations");

        Ok(deleted)
    }
}

// ============================================================================
// Credential Store Implementation
// ============================================================================

impl CredentialStore for PgAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<CredentialRecord>> {
        let row = sqlx::query_as::<_, CredentialRecordRow>(
            r#"
            SELECT
                i.id,
                i.email,
                i.display_name,
                i.role,
                i.created_at,
                i.updated_at,
                c.password_hash,
                c.updated_at AS credential_updated_at
            FROM identities i
            JOIN credentials c ON c.identity_id = i.id
            WHERE i.email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_record()).transpose()
    }

    async fn find_identity(&self, id: &UserId) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, display_name, role, created_at, updated_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn find_credential(&self, id: &UserId) -> AuthResult<Option<StoredCredential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT identity_id, password_hash, updated_at
            FROM credentials
            WHERE identity_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_credential()))
    }

    async fn insert_identity(
        &self,
        identity: &Identity,
        credential: &StoredCredential,
    ) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO identities (
                id,
                email,
                display_name,
                role,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(identity.id.as_uuid())
        .bind(identity.email.as_str())
        .bind(identity.display_name.as_str())
        .bind(identity.role.id())
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::EmailTaken,
            other => AuthError::StoreUnavailable(other),
        })?;

        sqlx::query(
            r#"
            INSERT INTO credentials (identity_id, password_hash, updated_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(credential.identity_id.as_uuid())
        .bind(credential.password_hash.as_phc_string())
        .bind(credential.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_credential(&self, credential: &StoredCredential) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE credentials SET
                password_hash = $2,
                updated_at = $3
            WHERE identity_id = $1
            "#,
        )
        .bind(credential.identity_id.as_uuid())
        .bind(credential.password_hash.as_phc_string())
        .bind(credential.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_role(&self, id: &UserId, role: UserRole) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE identities SET
                role = $2,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(role.id())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn delete_identity(&self, id: &UserId) -> AuthResult<bool> {
        // credentials cascade
        let deleted = sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list_identities(&self) -> AuthResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, display_name, role, created_at, updated_at
            FROM identities
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_identity()).collect()
    }
}

// ============================================================================
// Revocation Store Implementation
// ============================================================================

impl RevocationStore for PgAuthRepository {
    async fn revoke_session(
        &self,
        id: &UserId,
        issued_at_ms: i64,
        retain_until_ms: i64,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO session_revocations (identity_id, issued_at_ms, retain_until_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (identity_id, issued_at_ms) DO UPDATE SET
                retain_until_ms = GREATEST(session_revocations.retain_until_ms, EXCLUDED.retain_until_ms)
            "#,
        )
        .bind(id.as_uuid())
        .bind(issued_at_ms)
        .bind(retain_until_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke_all(
        &self,
        id: &UserId,
        issued_before_ms: i64,
        retain_until_ms: i64,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO session_watermarks (identity_id, issued_before_ms, retain_until_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (identity_id) DO UPDATE SET
                issued_before_ms = GREATEST(session_watermarks.issued_before_ms, EXCLUDED.issued_before_ms),
                retain_until_ms = GREATEST(session_watermarks.retain_until_ms, EXCLUDED.retain_until_ms)
            "#,
        )
        .bind(id.as_uuid())
        .bind(issued_before_ms)
        .bind(retain_until_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn watermark(&self, id: &UserId) -> AuthResult<Option<i64>> {
        let watermark = sqlx::query_scalar::<_, i64>(
            "SELECT issued_before_ms FROM session_watermarks WHERE identity_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(watermark)
    }

    async fn is_revoked(&self, id: &UserId, issued_at_ms: i64) -> AuthResult<bool> {
        let revoked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT
                EXISTS(
                    SELECT 1 FROM session_revocations
                    WHERE identity_id = $1 AND issued_at_ms = $2
                )
                OR EXISTS(
                    SELECT 1 FROM session_watermarks
                    WHERE identity_id = $1 AND issued_before_ms >= $2
                )
            "#,
        )
        .bind(id.as_uuid())
        .bind(issued_at_ms)
        .fetch_one(&self.pool)
        .await?;

        Ok(revoked)
    }

    async fn purge_expired(&self, now_ms: i64) -> AuthResult<u64> {
        let mut tx = self.pool.begin().await?;

        let sessions = sqlx::query("DELETE FROM session_revocations WHERE retain_until_ms < $1")
            .bind(now_ms)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let watermarks = sqlx::query("DELETE FROM session_watermarks WHERE retain_until_ms < $1")
            .bind(now_ms)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(sessions + watermarks)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    display_name: String,
    role: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IdentityRow {
    fn into_identity(self) -> AuthResult<Identity> {
        let role = UserRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;

        Ok(Identity {
            id: UserId::from_uuid(self.id),
            email: Email::from_db(self.email),
            display_name: DisplayName::from_db(self.display_name),
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    identity_id: Uuid,
    password_hash: String,
    updated_at: DateTime<Utc>,
}

impl CredentialRow {
    fn into_credential(self) -> StoredCredential {
        StoredCredential {
            identity_id: UserId::from_uuid(self.identity_id),
            password_hash: UserPassword::from_db(self.password_hash),
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRecordRow {
    #[sqlx(flatten)]
    identity: IdentityRow,
    password_hash: String,
    credential_updated_at: DateTime<Utc>,
}

impl CredentialRecordRow {
    fn into_record(self) -> AuthResult<CredentialRecord> {
        let identity = self.identity.into_identity()?;
        let credential = StoredCredential {
            identity_id: identity.id,
            password_hash: UserPassword::from_db(self.password_hash),
            updated_at: self.credential_updated_at,
        };

        Ok(CredentialRecord {
            identity,
            credential,
        })
    }
}
