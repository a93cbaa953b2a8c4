//! Rate Limiting Infrastructure
//!
//! Common rate limiting abstractions and an in-process fixed-window store.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Seconds until the window resets, rounded up (for `Retry-After`)
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let remaining_ms = (self.reset_at_ms - now_ms).max(0) as u64;
        remaining_ms.div_ceil(1000)
    }
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment rate limit counter
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>>;
}

/// Current wall-clock time in Unix milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at_ms: i64,
    count: u32,
}

/// Fixed-window counters held in process memory
///
/// Suitable for a single instance. Expired windows are dropped lazily once
/// the map grows past `prune_threshold` keys.
#[derive(Debug)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
    prune_threshold: usize,
}

impl Default for MemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            prune_threshold: 10_000,
        }
    }

    /// Same as [`RateLimitStore::check_and_increment`] at an explicit time
    pub async fn check_at(&self, key: &str, config: &RateLimitConfig, now_ms: i64) -> RateLimitResult {
        let window_ms = config.window_ms();
        let mut windows = self.windows.lock().await;

        if windows.len() >= self.prune_threshold {
            windows.retain(|_, w| now_ms - w.started_at_ms < window_ms);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at_ms: now_ms,
            count: 0,
        });

        if now_ms - window.started_at_ms >= window_ms {
            *window = Window {
                started_at_ms: now_ms,
                count: 0,
            };
        }

        let reset_at_ms = window.started_at_ms + window_ms;
        if window.count >= config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_at_ms,
            };
        }

        window.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: config.max_requests - window.count,
            reset_at_ms,
        }
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.check_at(key, config, now_ms()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocks_after_limit() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(3, 60);

        for expected_remaining in [2, 1, 0] {
            let result = store.check_at("1.2.3.4", &config, 1_000).await;
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let blocked = store.check_at("1.2.3.4", &config, 2_000).await;
        assert!(!blocked.allowed);
        assert_eq!(blocked.reset_at_ms, 61_000);
        assert_eq!(blocked.retry_after_secs(2_000), 59);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_at("a", &config, 0).await.allowed);
        assert!(!store.check_at("a", &config, 0).await.allowed);
        assert!(store.check_at("b", &config, 0).await.allowed);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_at("a", &config, 0).await.allowed);
        assert!(!store.check_at("a", &config, 59_999).await.allowed);
        assert!(store.check_at("a", &config, 60_000).await.allowed);
    }

    #[tokio::test]
    async fn test_trait_uses_wall_clock() {
        let store = MemoryRateLimitStore::default();
        let config = RateLimitConfig::default();
        let result = RateLimitStore::check_and_increment(&store, "k", &config)
            .await
            .unwrap();
        assert!(result.allowed);
        assert_eq!(result.remaining, config.max_requests - 1);
    }
}
