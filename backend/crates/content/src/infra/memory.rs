//! In-Memory Content Repository

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kernel::id::ContentItemId;
use tokio::sync::RwLock;

use crate::domain::entity::ContentItem;
use crate::domain::repository::{ContentFilter, ContentRepository};
use crate::domain::value_object::{ContentKind, Slug};
use crate::error::{ContentError, ContentResult};

/// In-memory content repository, shared between clones
#[derive(Clone, Default)]
pub struct MemoryContentRepository {
    items: Arc<RwLock<HashMap<ContentItemId, ContentItem>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `StoreUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> ContentResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ContentError::StoreUnavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn slug_in_use(
    items: &HashMap<ContentItemId, ContentItem>,
    kind: ContentKind,
    slug: &Slug,
    except: &ContentItemId,
) -> bool {
    items
        .values()
        .any(|item| item.kind == kind && item.slug == *slug && item.id != *except)
}

impl ContentRepository for MemoryContentRepository {
    async fn insert(&self, item: &ContentItem) -> ContentResult<()> {
        self.check_available()?;
        let mut items = self.items.write().await;

        if slug_in_use(&items, item.kind, &item.slug, &item.id) {
            return Err(ContentError::SlugTaken);
        }
        items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update(&self, item: &ContentItem) -> ContentResult<bool> {
        self.check_available()?;
        let mut items = self.items.write().await;

        if !items
            .get(&item.id)
            .is_some_and(|existing| existing.kind == item.kind)
        {
            return Ok(false);
        }
        if slug_in_use(&items, item.kind, &item.slug, &item.id) {
            return Err(ContentError::SlugTaken);
        }
        items.insert(item.id, item.clone());
        Ok(true)
    }

    async fn delete(&self, kind: ContentKind, id: &ContentItemId) -> ContentResult<bool> {
        self.check_available()?;
        let mut items = self.items.write().await;

        if !items.get(id).is_some_and(|item| item.kind == kind) {
            return Ok(false);
        }
        items.remove(id);

        for child in items.values_mut() {
            if child.course_id == Some(*id) {
                child.course_id = None;
            }
        }
        Ok(true)
    }

    async fn find(&self, kind: ContentKind, id: &ContentItemId) -> ContentResult<Option<ContentItem>> {
        self.check_available()?;
        let items = self.items.read().await;
        Ok(items.get(id).filter(|item| item.kind == kind).cloned())
    }

    async fn find_by_slug(
        &self,
        kind: ContentKind,
        slug: &Slug,
    ) -> ContentResult<Option<ContentItem>> {
        self.check_available()?;
        let items = self.items.read().await;
        Ok(items
            .values()
            .find(|item| item.kind == kind && item.slug == *slug)
            .cloned())
    }

    async fn list(
        &self,
        kind: ContentKind,
        filter: ContentFilter,
    ) -> ContentResult<Vec<ContentItem>> {
        self.check_available()?;
        let items = self.items.read().await;

        let mut found: Vec<ContentItem> = items
            .values()
            .filter(|item| item.kind == kind)
            .filter(|item| !filter.published_only || item.published)
            .filter(|item| filter.course_id.is_none() || item.course_id == filter.course_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::ContentDraft;
    use kernel::id::IdentityId;

    fn item(kind: ContentKind, slug: &str, course_id: Option<ContentItemId>) -> ContentItem {
        ContentItem::new(
            kind,
            ContentDraft {
                slug: Slug::new(slug).unwrap(),
                title: slug.to_string(),
                summary: String::new(),
                body: serde_json::json!({}),
                course_id,
                published: true,
            },
            IdentityId::new(),
        )
    }

    #[tokio::test]
    async fn test_slug_unique_per_kind() {
        let repo = MemoryContentRepository::new();
        repo.insert(&item(ContentKind::Blog, "intro", None)).await.unwrap();
        repo.insert(&item(ContentKind::Course, "intro", None)).await.unwrap();

        let result = repo.insert(&item(ContentKind::Blog, "intro", None)).await;
        assert!(matches!(result, Err(ContentError::SlugTaken)));
    }

    #[tokio::test]
    async fn test_find_respects_kind() {
        let repo = MemoryContentRepository::new();
        let blog = item(ContentKind::Blog, "post", None);
        repo.insert(&blog).await.unwrap();

        assert!(repo.find(ContentKind::Blog, &blog.id).await.unwrap().is_some());
        assert!(repo.find(ContentKind::Video, &blog.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_course_detaches_children() {
        let repo = MemoryContentRepository::new();
        let course = item(ContentKind::Course, "rust", None);
        let video = item(ContentKind::Video, "lesson-1", Some(course.id));
        repo.insert(&course).await.unwrap();
        repo.insert(&video).await.unwrap();

        assert!(repo.delete(ContentKind::Course, &course.id).await.unwrap());

        let video = repo.find(ContentKind::Video, &video.id).await.unwrap().unwrap();
        assert_eq!(video.course_id, None);
        assert!(!repo.delete(ContentKind::Course, &course.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let repo = MemoryContentRepository::new();
        repo.set_unavailable(true);

        let result = repo.list(ContentKind::Blog, ContentFilter::default()).await;
        assert!(matches!(result, Err(ContentError::StoreUnavailable(_))));
    }
}
