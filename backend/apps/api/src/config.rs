//! Server Configuration
//!
//! Everything is read from the environment (`.env` is loaded first by
//! `main`). Debug builds fall back to a random session key so a fresh
//! checkout runs without secrets; release builds refuse to start without one.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::models::signing_key::{Keyring, MIN_KEY_BYTES, SigningKey};
use auth::{AdminSeed, AuthConfig, MAX_SESSION_TTL};
use platform::config::{decode_secret, env_flag, env_list, env_opt, env_parse, env_required};
use platform::password::HashParams;
use platform::rate_limit::RateLimitConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:40922", "http://127.0.0.1:40922"];
const DEFAULT_KEY_ID: &str = "primary";

pub struct ApiConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    /// Administrator to provision at startup
    pub admin_seed: Option<AdminSeed>,
    /// How often expired deny-list entries are purged
    pub purge_interval: Duration,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env_required("DATABASE_URL")?;

        let bind_addr = env_opt("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let mut frontend_origins = env_list("FRONTEND_ORIGINS");
        if frontend_origins.is_empty() {
            frontend_origins = DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect();
        }

        let admin_seed = match env_opt("ADMIN_EMAIL") {
            Some(email) => Some(AdminSeed {
                email,
                password: env_required("ADMIN_PASSWORD")
                    .context("ADMIN_PASSWORD is required when ADMIN_EMAIL is set")?,
                display_name: env_opt("ADMIN_DISPLAY_NAME")
                    .unwrap_or_else(|| "Administrator".to_string()),
            }),
            None => None,
        };

        let purge_interval =
            Duration::from_secs(env_parse("REVOCATION_PURGE_INTERVAL_SECS", 3600)?);
        if purge_interval.is_zero() {
            bail!("REVOCATION_PURGE_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            auth: auth_config_from_env()?,
            admin_seed,
            purge_interval,
        })
    }
}

fn auth_config_from_env() -> anyhow::Result<AuthConfig> {
    let mut config = match load_keyring()? {
        Some(keyring) => AuthConfig::with_keyring(keyring),
        None if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SIGNING_KEY not set, using a random key (sessions end on restart)");
            AuthConfig::development()
        }
        None => bail!("SESSION_SIGNING_KEY must be set in release builds"),
    };

    config.session_ttl = session_ttl(env_parse("SESSION_TTL_SECS", 3600)?)?;
    config.cookie_secure = env_flag("COOKIE_SECURE", config.cookie_secure)?;
    config.password_pepper = env_opt("PASSWORD_PEPPER").map(String::into_bytes);

    let defaults = HashParams::default();
    config.hash_params = HashParams::new(
        env_parse("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
        env_parse("ARGON2_ITERATIONS", defaults.iterations)?,
        env_parse("ARGON2_PARALLELISM", defaults.parallelism)?,
    );

    config.allow_sign_up = env_flag("ALLOW_SIGN_UP", false)?;
    config.resolve_identity = env_flag("GATE_RESOLVES_IDENTITY", false)?;
    config.check_breached_passwords = env_flag("CHECK_BREACHED_PASSWORDS", false)?;
    config.trust_forwarded_for = env_flag("TRUST_FORWARDED_FOR", false)?;
    config.sign_in_rate_limit = RateLimitConfig::new(
        env_parse("SIGN_IN_RATE_LIMIT", config.sign_in_rate_limit.max_requests)?,
        env_parse(
            "SIGN_IN_RATE_WINDOW_SECS",
            config.sign_in_rate_limit.window.as_secs(),
        )?,
    );

    Ok(config)
}

fn session_ttl(secs: u64) -> anyhow::Result<Duration> {
    let ttl = Duration::from_secs(secs);
    if ttl.is_zero() {
        bail!("SESSION_TTL_SECS must be greater than zero");
    }
    if ttl > MAX_SESSION_TTL {
        bail!(
            "SESSION_TTL_SECS must be at most {} (30 days)",
            MAX_SESSION_TTL.as_secs()
        );
    }
    Ok(ttl)
}

/// Current key from `SESSION_SIGNING_KEY` / `SESSION_KEY_ID`, previous keys
/// from `SESSION_PREVIOUS_KEYS` (`kid:base64,kid:base64`)
fn load_keyring() -> anyhow::Result<Option<Keyring>> {
    let Some(raw) = env_opt("SESSION_SIGNING_KEY") else {
        return Ok(None);
    };

    let key_id = env_opt("SESSION_KEY_ID").unwrap_or_else(|| DEFAULT_KEY_ID.to_string());
    let secret = decode_secret("SESSION_SIGNING_KEY", &raw, MIN_KEY_BYTES)?;
    let current = SigningKey::new(key_id, secret).context("SESSION_SIGNING_KEY")?;

    let previous = env_list("SESSION_PREVIOUS_KEYS")
        .iter()
        .map(|entry| parse_previous_key(entry))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let keyring = Keyring::new(current, previous).context("SESSION_PREVIOUS_KEYS")?;
    Ok(Some(keyring))
}

fn parse_previous_key(entry: &str) -> anyhow::Result<SigningKey> {
    let Some((key_id, secret)) = entry.split_once(':') else {
        bail!("SESSION_PREVIOUS_KEYS entries must look like kid:base64");
    };
    let secret = decode_secret("SESSION_PREVIOUS_KEYS", secret, MIN_KEY_BYTES)?;
    SigningKey::new(key_id.trim(), secret).with_context(|| format!("previous key {key_id:?}"))
}
