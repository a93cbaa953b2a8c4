//! Domain Entities

pub mod audit;
pub mod credential;
pub mod identity;
pub mod session;
