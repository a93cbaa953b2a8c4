//! Content Administration Use Case
//!
//! Create, update, delete and list items regardless of publication state.
//! Callers are expected to sit behind the ADMIN gate. Every successful
//! mutation is recorded as an admin action on the audit sink.

use std::sync::Arc;

use auth::{AuditEvent, AuditSink};
use kernel::id::{ContentItemId, IdentityId};
use serde_json::json;

use crate::domain::entity::{ContentDraft, ContentItem};
use crate::domain::repository::{ContentFilter, ContentRepository};
use crate::domain::value_object::{ContentKind, Slug, validate_summary, validate_title};
use crate::error::{ContentError, ContentResult};

/// Unvalidated editable fields
#[derive(Debug, Clone)]
pub struct DraftInput {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: serde_json::Value,
    pub course_id: Option<ContentItemId>,
    pub published: bool,
}

pub struct ManageContentUseCase<C>
where
    C: ContentRepository,
{
    repo: Arc<C>,
    audit: Arc<dyn AuditSink>,
}

impl<C> ManageContentUseCase<C>
where
    C: ContentRepository,
{
    pub fn new(repo: Arc<C>, audit: Arc<dyn AuditSink>) -> Self {
        Self { repo, audit }
    }

    /// Every item of `kind`, drafts included
    pub async fn list(&self, kind: ContentKind) -> ContentResult<Vec<ContentItem>> {
        self.repo.list(kind, ContentFilter::default()).await
    }

    pub async fn create(
        &self,
        author_id: IdentityId,
        kind: ContentKind,
        input: DraftInput,
    ) -> ContentResult<ContentItem> {
        let draft = self.validate(kind, input).await?;
        let item = ContentItem::new(kind, draft, author_id);

        self.repo.insert(&item).await?;

        self.audit.record(AuditEvent::admin_action(
            author_id.to_string(),
            "create_content",
            json!({ "target": item.id, "kind": kind, "slug": item.slug.as_str() }),
        ));
        tracing::info!(
            content_id = %item.id,
            kind = %kind,
            author_id = %author_id,
            published = item.published,
            "Content created"
        );
        Ok(item)
    }

    pub async fn update(
        &self,
        actor: IdentityId,
        kind: ContentKind,
        id: &ContentItemId,
        input: DraftInput,
    ) -> ContentResult<ContentItem> {
        let mut item = self
            .repo
            .find(kind, id)
            .await?
            .ok_or(ContentError::NotFound)?;

        if input.course_id == Some(*id) {
            return Err(ContentError::InvalidInput(
                "An item cannot be its own course".to_string(),
            ));
        }

        let draft = self.validate(kind, input).await?;
        item.apply(draft);

        if !self.repo.update(&item).await? {
            return Err(ContentError::NotFound);
        }

        self.audit.record(AuditEvent::admin_action(
            actor.to_string(),
            "update_content",
            json!({ "target": item.id, "kind": kind, "published": item.published }),
        ));
        tracing::info!(actor = %actor, content_id = %item.id, kind = %kind, "Content updated");
        Ok(item)
    }

    pub async fn delete(
        &self,
        actor: IdentityId,
        kind: ContentKind,
        id: &ContentItemId,
    ) -> ContentResult<()> {
        if !self.repo.delete(kind, id).await? {
            return Err(ContentError::NotFound);
        }

        self.audit.record(AuditEvent::admin_action(
            actor.to_string(),
            "delete_content",
            json!({ "target": id, "kind": kind }),
        ));
        tracing::info!(actor = %actor, content_id = %id, kind = %kind, "Content deleted");
        Ok(())
    }

    async fn validate(&self, kind: ContentKind, input: DraftInput) -> ContentResult<ContentDraft> {
        let slug = Slug::new(&input.slug)?;
        let title = validate_title(&input.title)?;
        let summary = validate_summary(&input.summary)?;

        let body = match input.body {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            body @ serde_json::Value::Object(_) => body,
            _ => {
                return Err(ContentError::InvalidInput(
                    "Body must be a JSON object".to_string(),
                ));
            }
        };

        if let Some(course_id) = input.course_id {
            if !kind.has_parent_course() {
                return Err(ContentError::InvalidInput(
                    "Only materials and videos belong to a course".to_string(),
                ));
            }
            if self
                .repo
                .find(ContentKind::Course, &course_id)
                .await?
                .is_none()
            {
                return Err(ContentError::InvalidInput(
                    "Parent course not found".to_string(),
                ));
            }
        }

        Ok(ContentDraft {
            slug,
            title,
            summary,
            body,
            course_id: input.course_id,
            published: input.published,
        })
    }
}
