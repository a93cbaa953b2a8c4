//! Infrastructure Layer

pub mod memory;
pub mod postgres;

pub use memory::MemoryContentRepository;
pub use postgres::PgContentRepository;
