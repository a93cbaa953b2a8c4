//! Infrastructure Layer
//!
//! Database implementations, in-memory stores and audit sinks.

pub mod audit;
pub mod memory;
pub mod postgres;

pub use audit::{PgAuditSink, TracingAuditSink};
pub use memory::{MemoryAuditSink, MemoryAuthRepository};
pub use postgres::PgAuthRepository;
