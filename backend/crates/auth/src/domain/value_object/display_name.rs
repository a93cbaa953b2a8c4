//! Display Name Value Object
//!
//! Human-readable name shown next to content an account authored. Unlike
//! the email it is not unique and never used to log in.
//!
//! NFKC normalized and trimmed; 1 to 64 characters; no control characters.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Maximum length for display name (in characters)
pub const DISPLAY_NAME_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayNameError {
    #[error("Display name cannot be empty")]
    Empty,

    #[error("Display name is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("Display name contains control characters")]
    ControlCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, DisplayNameError> {
        let normalized = input.as_ref().nfkc().collect::<String>().trim().to_string();

        if normalized.is_empty() {
            return Err(DisplayNameError::Empty);
        }

        let length = normalized.chars().count();
        if length > DISPLAY_NAME_MAX_LENGTH {
            return Err(DisplayNameError::TooLong {
                length,
                max: DISPLAY_NAME_MAX_LENGTH,
            });
        }

        if normalized.chars().any(char::is_control) {
            return Err(DisplayNameError::ControlCharacter);
        }

        Ok(Self(normalized))
    }

    /// Create from database value (assumed already validated)
    #[inline]
    pub fn from_db(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = DisplayNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}
