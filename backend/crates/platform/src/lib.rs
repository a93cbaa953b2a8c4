//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64url, random bytes)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie and bearer credential handling
//! - Client address extraction
//! - Rate limiting infrastructure
//! - Environment configuration helpers

pub mod client;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
