//! Session Signing Keys
//!
//! HMAC-SHA256 keys identified by a short key id (`kid`). The keyring holds
//! exactly one current key, used to sign new sessions, plus any number of
//! previous keys that are still accepted for validation. Retiring a key
//! means dropping it from the keyring.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

/// Minimum key length in bytes (HMAC-SHA256 block output size)
pub const MIN_KEY_BYTES: usize = 32;

/// Maximum key id length
const MAX_KEY_ID_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningKeyError {
    #[error("Key id must be 1-{MAX_KEY_ID_LENGTH} characters of [A-Za-z0-9_-]")]
    InvalidKeyId,

    #[error("Signing key must be at least {MIN_KEY_BYTES} bytes")]
    TooShort,

    #[error("Duplicate key id: {0}")]
    DuplicateKeyId(String),
}

/// One HMAC key with its id
#[derive(Clone)]
pub struct SigningKey {
    id: String,
    secret: Zeroizing<Vec<u8>>,
}

impl SigningKey {
    pub fn new(id: impl Into<String>, secret: Vec<u8>) -> Result<Self, SigningKeyError> {
        let id = id.into();
        let secret = Zeroizing::new(secret);

        if id.is_empty()
            || id.len() > MAX_KEY_ID_LENGTH
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(SigningKeyError::InvalidKeyId);
        }

        if secret.len() < MIN_KEY_BYTES {
            return Err(SigningKeyError::TooShort);
        }

        Ok(Self { id, secret })
    }

    /// Random key (development and tests)
    pub fn generate(id: impl Into<String>) -> Result<Self, SigningKeyError> {
        Self::new(id, platform::crypto::random_bytes(MIN_KEY_BYTES))
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Current signing key plus previously issued keys still accepted
#[derive(Debug, Clone)]
pub struct Keyring {
    current: SigningKey,
    previous: Vec<SigningKey>,
}

impl Keyring {
    pub fn new(current: SigningKey, previous: Vec<SigningKey>) -> Result<Self, SigningKeyError> {
        let mut seen = vec![current.id.as_str()];
        for key in &previous {
            if seen.contains(&key.id.as_str()) {
                return Err(SigningKeyError::DuplicateKeyId(key.id.clone()));
            }
            seen.push(&key.id);
        }
        Ok(Self { current, previous })
    }

    pub fn single(current: SigningKey) -> Self {
        Self {
            current,
            previous: Vec::new(),
        }
    }

    /// Key used to sign new sessions
    #[inline]
    pub fn current(&self) -> &SigningKey {
        &self.current
    }

    /// Look up a key accepted for validation
    pub fn get(&self, id: &str) -> Option<&SigningKey> {
        std::iter::once(&self.current)
            .chain(self.previous.iter())
            .find(|key| key.id == id)
    }

    /// Ids of every accepted key, current first
    pub fn key_ids(&self) -> Vec<&str> {
        std::iter::once(&self.current)
            .chain(self.previous.iter())
            .map(|key| key.id.as_str())
            .collect()
    }
}
