//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Postgres and in-memory stores, audit sinks
//! - `presentation/` - HTTP handlers, DTOs, router, role gate
//!
//! ## Features
//! - One sign-in path: email + password, uniform failure
//! - Stateless HMAC-signed session tokens with key rotation
//! - Deny-list for sign-out and "revoke all sessions"
//! - Role gate (User, Admin) as axum middleware
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B policy for new ones)
//! - Unknown emails cost the same as wrong passwords (decoy hash)
//! - Role change, password change and deletion revoke every session
//! - Audit events for sign-in attempts and administrative changes

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, MAX_SESSION_TTL};
pub use application::{AdminSeed, AuthorizationGate, Principal, ProvisionOutcome, SessionIssuer};
pub use domain::entity::audit::{AuditEvent, AuditSink};
pub use domain::repository::{CredentialStore, RevocationStore};
pub use domain::value_object::user_role::UserRole;
pub use error::{AuthError, AuthResult};
pub use infra::{
    MemoryAuditSink, MemoryAuthRepository, PgAuditSink, PgAuthRepository, TracingAuditSink,
};
pub use presentation::{AuthAppState, GateState, auth_router, gate, require_role};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
