//! API Server Library
//!
//! Router assembly and configuration, shared by the binary and the
//! end-to-end tests.

pub mod app;
pub mod config;

pub use app::build_router;
pub use config::ApiConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
