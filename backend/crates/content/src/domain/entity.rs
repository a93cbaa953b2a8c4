//! Content Entity

use chrono::{DateTime, Utc};
use kernel::id::{ContentItemId, IdentityId};

use crate::domain::value_object::{ContentKind, Slug};

/// Blog post, course, course material or video
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub id: ContentItemId,
    pub kind: ContentKind,
    pub slug: Slug,
    pub title: String,
    pub summary: String,
    /// Structured document rendered by the frontend
    pub body: serde_json::Value,
    /// Parent course (materials and videos only)
    pub course_id: Option<ContentItemId>,
    pub published: bool,
    pub author_id: IdentityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated editable fields
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDraft {
    pub slug: Slug,
    pub title: String,
    pub summary: String,
    pub body: serde_json::Value,
    pub course_id: Option<ContentItemId>,
    pub published: bool,
}

impl ContentItem {
    pub fn new(kind: ContentKind, draft: ContentDraft, author_id: IdentityId) -> Self {
        let now = Utc::now();
        Self {
            id: ContentItemId::new(),
            kind,
            slug: draft.slug,
            title: draft.title,
            summary: draft.summary,
            body: draft.body,
            course_id: draft.course_id,
            published: draft.published,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields, keeping id, kind, author and creation time
    pub fn apply(&mut self, draft: ContentDraft) {
        self.slug = draft.slug;
        self.title = draft.title;
        self.summary = draft.summary;
        self.body = draft.body;
        self.course_id = draft.course_id;
        self.published = draft.published;
        self.updated_at = Utc::now();
    }
}
