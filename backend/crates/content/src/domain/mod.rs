//! Domain Layer
//!
//! Content entity, value objects, and repository trait.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{ContentDraft, ContentItem};
pub use repository::{ContentFilter, ContentRepository};
pub use value_object::{ContentKind, Slug};
