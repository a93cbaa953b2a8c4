//! Environment Configuration Helpers
//!
//! Thin typed readers over process environment variables. Unset and empty
//! variables are treated the same.

use std::{env, str::FromStr};

use thiserror::Error;

use crate::crypto::from_base64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: String, reason: String },
}

/// Read a variable, treating empty values as unset
pub fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a required variable
pub fn env_required(name: &str) -> Result<String, ConfigError> {
    env_opt(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

/// Read and parse a variable, falling back to `default` when unset
pub fn env_parse<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

/// Read a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`)
pub fn env_flag(name: &str, default: bool) -> Result<bool, ConfigError> {
    match env_opt(name) {
        Some(raw) => parse_flag(name, &raw),
        None => Ok(default),
    }
}

/// Read a comma-separated list, skipping empty items
pub fn env_list(name: &str) -> Vec<String> {
    env_opt(name).map(|raw| split_list(&raw)).unwrap_or_default()
}

/// Decode a base64 secret of at least `min_len` bytes
pub fn decode_secret(name: &str, raw: &str, min_len: usize) -> Result<Vec<u8>, ConfigError> {
    let bytes = from_base64(raw.trim()).map_err(|e| ConfigError::Invalid {
        name: name.to_string(),
        reason: format!("not valid base64 ({e})"),
    })?;
    if bytes.len() < min_len {
        return Err(ConfigError::Invalid {
            name: name.to_string(),
            reason: format!("must decode to at least {min_len} bytes"),
        });
    }
    Ok(bytes)
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name: name.to_string(),
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
