//! Repository Traits

use kernel::id::ContentItemId;

use crate::domain::entity::ContentItem;
use crate::domain::value_object::{ContentKind, Slug};
use crate::error::ContentResult;

/// Listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentFilter {
    /// Only published items
    pub published_only: bool,
    /// Only children of this course
    pub course_id: Option<ContentItemId>,
}

/// Content persistence
#[trait_variant::make(ContentRepository: Send)]
pub trait LocalContentRepository {
    /// Insert a new item
    ///
    /// Fails with `SlugTaken` when the slug exists for the same kind.
    async fn insert(&self, item: &ContentItem) -> ContentResult<()>;

    /// Replace an existing item, returns false when it does not exist
    async fn update(&self, item: &ContentItem) -> ContentResult<bool>;

    /// Delete an item, returns false when it does not exist
    ///
    /// Children of a deleted course are detached, not deleted.
    async fn delete(&self, kind: ContentKind, id: &ContentItemId) -> ContentResult<bool>;

    async fn find(&self, kind: ContentKind, id: &ContentItemId) -> ContentResult<Option<ContentItem>>;

    async fn find_by_slug(&self, kind: ContentKind, slug: &Slug)
    -> ContentResult<Option<ContentItem>>;

    /// Items of one kind, newest first
    async fn list(&self, kind: ContentKind, filter: ContentFilter)
    -> ContentResult<Vec<ContentItem>>;
}
