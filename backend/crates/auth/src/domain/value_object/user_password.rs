//! User Password Value Object
//!
//! Domain value objects for user passwords with NIST SP 800-63B compliance.
//! Delegates to `platform::password` for cryptographic operations.
//!
//! ## Security Features
//! - Argon2id hashing (memory-hard)
//! - Automatic memory zeroization
//! - Constant-time comparison
//! - Unicode NFKC normalization
//! - Optional breach checking via HIBP API

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordHasher,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a password that is about to be set
    ///
    /// ## Validation Rules (NIST SP 800-63B)
    /// - 8 to 128 characters
    /// - No control characters
    /// - No common patterns (sequential, keyboard, dictionary)
    /// - Unicode NFKC normalized
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(AuthError::PasswordPolicy)?;
        Ok(Self(clear_text))
    }

    /// Wrap a password submitted for verification
    ///
    /// Policy is not applied so that older passwords keep working.
    pub fn for_verification(raw: String) -> Result<Self, PasswordHashError> {
        ClearTextPassword::for_verification(raw).map(Self)
    }

    /// Check if password has been compromised (via HIBP API)
    ///
    /// Uses k-Anonymity model - only SHA-1 prefix is sent to API.
    ///
    /// ## Returns
    /// - `Ok(true)` if compromised
    /// - `Ok(false)` if not found in breaches
    /// - `Err(_)` if check failed (treat as non-blocking)
    pub async fn is_compromised(&self) -> Result<bool, PasswordHashError> {
        self.0.check_breach().await
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password for database storage
///
/// Stores password in Argon2id PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password
    ///
    /// Blocks for the full Argon2 run.
    pub fn hash(hasher: &PasswordHasher, raw: &RawPassword) -> AuthResult<Self> {
        hasher
            .hash(raw.inner())
            .map(Self)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))
    }

    /// Wrap a PHC string loaded from the database
    ///
    /// Not validated here: a corrupt value never verifies.
    pub fn from_db(phc_string: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(phc_string))
    }

    /// Get PHC string for database storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash
    ///
    /// Blocks for the full Argon2 run.
    pub fn verify(&self, hasher: &PasswordHasher, raw: &RawPassword) -> bool {
        hasher.verify(raw.inner(), &self.0)
    }

    /// Whether the hash was produced with parameters other than `hasher`'s
    pub fn needs_rehash(&self, hasher: &PasswordHasher) -> bool {
        hasher.needs_rehash(&self.0)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

impl fmt::Display for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[HASHED_PASSWORD]")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::{HashParams, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashParams::new(1024, 1, 1), None).unwrap()
    }

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("ValidPass123!".to_string()).is_ok());

        let short_pass = "a".repeat(MIN_PASSWORD_LENGTH - 1);
        assert!(matches!(
            RawPassword::new(short_pass),
            Err(AuthError::PasswordPolicy(_))
        ));

        let long_pass = "ab".repeat(MAX_PASSWORD_LENGTH);
        assert!(RawPassword::new(long_pass).is_err());

        assert!(RawPassword::new("password123".to_string()).is_err());
        assert!(RawPassword::new("".to_string()).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::hash(&hasher, &raw).unwrap();

        assert!(hashed.verify(&hasher, &raw));

        let wrong = RawPassword::for_verification("WrongPassword123!".to_string()).unwrap();
        assert!(!hashed.verify(&hasher, &wrong));
    }

    #[test]
    fn test_db_roundtrip() {
        let hasher = hasher();
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::hash(&hasher, &raw).unwrap();

        let restored = UserPassword::from_db(hashed.as_phc_string().to_string());
        assert!(restored.verify(&hasher, &raw));
        assert!(!restored.needs_rehash(&hasher));

        let corrupt = UserPassword::from_db("garbage");
        assert!(!corrupt.verify(&hasher, &raw));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));

        let hashed = UserPassword::hash(&hasher(), &raw).unwrap();
        assert!(format!("{:?}", hashed).contains("HASH"));
        assert_eq!(hashed.to_string(), "[HASHED_PASSWORD]");
    }

    #[test]
    fn test_unicode_password() {
        let hasher = hasher();
        let raw = RawPassword::new("最も！！安全なパスワード".to_string()).unwrap();
        let hashed = UserPassword::hash(&hasher, &raw).unwrap();
        // Full-width input normalizes to the same NFKC form
        let again = RawPassword::for_verification("最も!!安全なパスワード".to_string()).unwrap();
        assert!(hashed.verify(&hasher, &again));
    }
}
