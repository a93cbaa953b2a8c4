//! Shared Kernel - vocabulary shared by every backend crate
//!
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed identifiers for domain entities ([`id::Id`])
//!
//! Only things whose meaning is identical across the auth and content
//! contexts belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
