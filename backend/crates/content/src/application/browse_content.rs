//! Public Browsing Use Case
//!
//! Read-only access to published items. Drafts are indistinguishable from
//! missing items.

use std::sync::Arc;

use kernel::id::ContentItemId;

use crate::domain::entity::ContentItem;
use crate::domain::repository::{ContentFilter, ContentRepository};
use crate::domain::value_object::{ContentKind, Slug};
use crate::error::{ContentError, ContentResult};

pub struct BrowseContentUseCase<C>
where
    C: ContentRepository,
{
    repo: Arc<C>,
}

impl<C> BrowseContentUseCase<C>
where
    C: ContentRepository,
{
    pub fn new(repo: Arc<C>) -> Self {
        Self { repo }
    }

    /// Published items of `kind`, optionally only those of one course
    pub async fn list(
        &self,
        kind: ContentKind,
        course_id: Option<ContentItemId>,
    ) -> ContentResult<Vec<ContentItem>> {
        self.repo
            .list(
                kind,
                ContentFilter {
                    published_only: true,
                    course_id,
                },
            )
            .await
    }

    /// Published item by id or slug
    pub async fn get(&self, kind: ContentKind, key: &str) -> ContentResult<ContentItem> {
        let item = match key.parse::<ContentItemId>() {
            Ok(id) => self.repo.find(kind, &id).await?,
            Err(_) => match Slug::new(key) {
                Ok(slug) => self.repo.find_by_slug(kind, &slug).await?,
                Err(_) => None,
            },
        };

        item.filter(|item| item.published)
            .ok_or(ContentError::NotFound)
    }
}
