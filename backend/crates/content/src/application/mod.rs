//! Application Layer

pub mod browse_content;
pub mod manage_content;

pub use browse_content::BrowseContentUseCase;
pub use manage_content::{DraftInput, ManageContentUseCase};
