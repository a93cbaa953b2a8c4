//! Content Backend Module
//!
//! Blog posts, courses, course materials and videos.
//!
//! - `domain/` - `ContentItem`, kinds, slugs, repository trait
//! - `application/` - browse (public) and manage (admin) use cases
//! - `infra/` - Postgres and in-memory repositories
//! - `presentation/` - DTOs, handlers, public and admin routers
//!
//! Public routes expose published items only. Admin routes are wrapped in
//! the auth crate's role gate.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

pub use application::{BrowseContentUseCase, DraftInput, ManageContentUseCase};
pub use domain::entity::{ContentDraft, ContentItem};
pub use domain::repository::{ContentFilter, ContentRepository};
pub use domain::value_object::{ContentKind, Slug};
pub use error::{ContentError, ContentResult};
pub use infra::{MemoryContentRepository, PgContentRepository};
pub use presentation::{ContentAppState, admin_content_router, content_router};
