//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ContentAppState;
pub use router::{admin_content_router, content_router};
