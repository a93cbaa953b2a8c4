//! PostgreSQL Content Repository

use chrono::{DateTime, Utc};
use kernel::id::{ContentItemId, IdentityId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::ContentItem;
use crate::domain::repository::{ContentFilter, ContentRepository};
use crate::domain::value_object::{ContentKind, Slug};
use crate::error::{ContentError, ContentResult};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        kind,
        slug,
        title,
        summary,
        body,
        course_id,
        published,
        author_id,
        created_at,
        updated_at
    FROM content_items
"#;

/// PostgreSQL-backed content repository
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error) -> ContentError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => ContentError::SlugTaken,
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            ContentError::InvalidInput("Parent course not found".to_string())
        }
        other => ContentError::StoreUnavailable(other),
    }
}

impl ContentRepository for PgContentRepository {
    async fn insert(&self, item: &ContentItem) -> ContentResult<()> {
        sqlx::query(
            r#"
            INSERT INTO content_items (
                id,
                kind,
                slug,
                title,
                summary,
                body,
                course_id,
                published,
                author_id,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.kind.id())
        .bind(item.slug.as_str())
        .bind(&item.title)
        .bind(&item.summary)
        .bind(&item.body)
        .bind(item.course_id.map(ContentItemId::into_uuid))
        .bind(item.published)
        .bind(item.author_id.as_uuid())
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn update(&self, item: &ContentItem) -> ContentResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE content_items SET
                slug = $3,
                title = $4,
                summary = $5,
                body = $6,
                course_id = $7,
                published = $8,
                updated_at = $9
            WHERE id = $1 AND kind = $2
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.kind.id())
        .bind(item.slug.as_str())
        .bind(&item.title)
        .bind(&item.summary)
        .bind(&item.body)
        .bind(item.course_id.map(ContentItemId::into_uuid))
        .bind(item.published)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn delete(&self, kind: ContentKind, id: &ContentItemId) -> ContentResult<bool> {
        // course_id references are cleared by ON DELETE SET NULL
        let deleted = sqlx::query("DELETE FROM content_items WHERE id = $1 AND kind = $2")
            .bind(id.as_uuid())
            .bind(kind.id())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn find(&self, kind: ContentKind, id: &ContentItemId) -> ContentResult<Option<ContentItem>> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1 AND kind = $2"
        ))
        .bind(id.as_uuid())
        .bind(kind.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentRow::into_item).transpose()
    }

    async fn find_by_slug(
        &self,
        kind: ContentKind,
        slug: &Slug,
    ) -> ContentResult<Option<ContentItem>> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "{SELECT_COLUMNS} WHERE kind = $1 AND slug = $2"
        ))
        .bind(kind.id())
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentRow::into_item).transpose()
    }

    async fn list(
        &self,
        kind: ContentKind,
        filter: ContentFilter,
    ) -> ContentResult<Vec<ContentItem>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            r#"{SELECT_COLUMNS}
            WHERE kind = $1
              AND (NOT $2 OR published)
              AND ($3::uuid IS NULL OR course_id = $3)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(kind.id())
        .bind(filter.published_only)
        .bind(filter.course_id.map(ContentItemId::into_uuid))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ContentRow::into_item).collect()
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ContentRow {
    id: Uuid,
    kind: i16,
    slug: String,
    title: String,
    summary: String,
    body: serde_json::Value,
    course_id: Option<Uuid>,
    published: bool,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentRow {
    fn into_item(self) -> ContentResult<ContentItem> {
        let kind = ContentKind::from_id(self.kind)
            .ok_or_else(|| ContentError::Internal(format!("Invalid content kind: {}", self.kind)))?;

        Ok(ContentItem {
            id: ContentItemId::from_uuid(self.id),
            kind,
            slug: Slug::from_db(self.slug),
            title: self.title,
            summary: self.summary,
            body: self.body,
            course_id: self.course_id.map(ContentItemId::from_uuid),
            published: self.published,
            author_id: IdentityId::from_uuid(self.author_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
