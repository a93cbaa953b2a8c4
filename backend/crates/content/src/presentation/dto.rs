//! API DTOs

use chrono::{DateTime, Utc};
use kernel::id::{ContentItemId, IdentityId};
use serde::{Deserialize, Serialize};

use crate::application::DraftInput;
use crate::domain::entity::ContentItem;
use crate::domain::value_object::ContentKind;

/// Create / replace request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: serde_json::Value,
    #[serde(default)]
    pub course_id: Option<ContentItemId>,
    #[serde(default)]
    pub published: bool,
}

impl From<ContentRequest> for DraftInput {
    fn from(request: ContentRequest) -> Self {
        Self {
            slug: request.slug,
            title: request.title,
            summary: request.summary,
            body: request.body,
            course_id: request.course_id,
            published: request.published,
        }
    }
}

/// Public listing query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseQuery {
    /// Only children of this course
    pub course: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub id: ContentItemId,
    pub kind: ContentKind,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: serde_json::Value,
    pub course_id: Option<ContentItemId>,
    pub published: bool,
    pub author_id: IdentityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentItem> for ContentResponse {
    fn from(item: ContentItem) -> Self {
        Self {
            id: item.id,
            kind: item.kind,
            slug: item.slug.as_str().to_string(),
            title: item.title,
            summary: item.summary,
            body: item.body,
            course_id: item.course_id,
            published: item.published,
            author_id: item.author_id,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentListResponse {
    pub items: Vec<ContentResponse>,
}

impl From<Vec<ContentItem>> for ContentListResponse {
    fn from(items: Vec<ContentItem>) -> Self {
        Self {
            items: items.into_iter().map(ContentResponse::from).collect(),
        }
    }
}
