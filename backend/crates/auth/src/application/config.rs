//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::password::HashParams;
use platform::rate_limit::RateLimitConfig;

use crate::domain::value_object::signing_key::{Keyring, SigningKey};

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;
use platform::cookie::CookieConfig;

/// Longest session lifetime a deployment may configure
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Signing keys for session tokens
    pub keyring: Keyring,
    /// Session lifetime
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id cost
    pub hash_params: HashParams,
    /// Whether anonymous visitors may create USER accounts
    pub allow_sign_up: bool,
    /// Re-read the identity on every gated request
    pub resolve_identity: bool,
    /// Per-client sign-in attempts
    pub sign_in_rate_limit: RateLimitConfig,
    /// Reject new passwords found in the HIBP corpus
    pub check_breached_passwords: bool,
    /// Take the client address from `X-Forwarded-For` (only behind a proxy)
    pub trust_forwarded_for: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let key = match SigningKey::generate("dev") {
            Ok(key) => key,
            Err(e) => unreachable!("generated key is valid: {e}"),
        };
        Self::with_keyring(Keyring::single(key))
    }
}

impl AuthConfig {
    /// Production defaults around a given keyring
    pub fn with_keyring(keyring: Keyring) -> Self {
        Self {
            session_cookie_name: "auth_session".to_string(),
            keyring,
            session_ttl: Duration::from_secs(3600), // 1 hour
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            hash_params: HashParams::default(),
            allow_sign_up: false,
            resolve_identity: false,
            sign_in_rate_limit: RateLimitConfig::new(10, 60),
            check_breached_passwords: false,
            trust_forwarded_for: false,
        }
    }

    /// Create config with a random signing key (for development)
    pub fn with_random_secret() -> Self {
        Self::default()
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Get session TTL in milliseconds, saturating at `i64::MAX`
    pub fn session_ttl_ms(&self) -> i64 {
        i64::try_from(self.session_ttl.as_millis()).unwrap_or(i64::MAX)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie settings for the session cookie
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(
                i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX),
            ),
        }
    }
}
