//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    audit::{AuditEvent, AuditSink},
    credential::{CredentialRecord, StoredCredential},
    identity::{Identity, VerifiedIdentity},
    session::{IssuedSession, Session, SessionError},
};
pub use repository::{CredentialStore, RevocationStore};
