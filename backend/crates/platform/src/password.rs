//! Password Hashing and Verification
//!
//! NIST SP 800-63B compliant password handling with:
//! - Argon2id hashing with a tunable cost ([`HashParams`])
//! - Zeroization of sensitive data
//! - Constant-time comparison
//! - A decoy hash so that "unknown account" costs as much as "wrong password"
//! - Optional HIBP (Have I Been Pwned) breach checking
//!
//! ## Security Features
//! - Memory-hard hashing prevents GPU/ASIC attacks
//! - Zeroization prevents memory inspection attacks
//! - Pepper support for additional security layer
//! - k-Anonymity model for breach checking (only SHA-1 prefix sent)
//!
//! ## Two kinds of input
//! New passwords go through [`ClearTextPassword::new`], which enforces the
//! policy. Passwords submitted at sign-in go through
//! [`ClearTextPassword::for_verification`], which only rejects empty or
//! oversized input: a stored hash predating a policy change must still verify.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use sha1::{Digest, Sha1};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{random_bytes, to_base64url};

// ============================================================================
// Constants (NIST SP 800-63B compliant)
// ============================================================================

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Hard upper bound on any plaintext handed to the hasher, in bytes
pub const MAX_PLAINTEXT_BYTES: usize = 1024;

/// HIBP API endpoint (k-Anonymity model)
const HIBP_API_URL: &str = "https://api.pwnedpasswords.com/range/";

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("This password has been compromised in a data breach")]
    Compromised,

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Empty or oversized plaintext
    #[error("Password input is empty or exceeds {MAX_PLAINTEXT_BYTES} bytes")]
    InvalidInput,

    /// Cost parameters rejected by Argon2
    #[error("Invalid hash parameters: {0}")]
    InvalidParams(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// HIBP API check failed (non-fatal, logged)
    #[error("Breach check failed: {0}")]
    BreachCheckFailed(String),
}

// ============================================================================
// Cost parameters
// ============================================================================

/// Argon2id cost parameters
///
/// The defaults follow the OWASP recommendation (m=19 MiB, t=2, p=1), which
/// lands around 50-100ms on commodity server hardware. Re-measure on the
/// deployment hardware and raise them as it gets faster; stored hashes with
/// older parameters are upgraded on the next successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashParams {
    pub const fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    fn to_argon2(self) -> Result<Params, PasswordHashError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new password, enforcing the policy for passwords being set
    ///
    /// Validates against NIST SP 800-63B requirements:
    /// - Minimum 8 characters
    /// - Maximum 128 characters
    /// - No control characters
    /// - Not empty/whitespace only
    ///
    /// Unicode is normalized using NFKC before validation.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let raw = Zeroizing::new(raw);
        if raw.len() > MAX_PLAINTEXT_BYTES {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: raw.chars().count(),
            });
        }

        let normalized = Self(raw.nfkc().collect());

        if normalized.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // NIST: count Unicode code points, not bytes
        let char_count = normalized.0.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Control characters except space, tab, newline
        if normalized
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&normalized.0) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(normalized)
    }

    /// Wrap a submitted password for verification only
    ///
    /// No policy is applied. Fails with [`PasswordHashError::InvalidInput`]
    /// for empty or oversized input.
    pub fn for_verification(raw: String) -> Result<Self, PasswordHashError> {
        let raw = Zeroizing::new(raw);
        if raw.is_empty() || raw.len() > MAX_PLAINTEXT_BYTES {
            return Err(PasswordHashError::InvalidInput);
        }

        let normalized = Self(raw.nfkc().collect());
        if normalized.0.len() > MAX_PLAINTEXT_BYTES {
            return Err(PasswordHashError::InvalidInput);
        }

        Ok(normalized)
    }

    /// Create without validation (for testing)
    #[cfg(test)]
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Check if password has been compromised using HIBP API
    ///
    /// Uses k-Anonymity model:
    /// 1. Hash password with SHA-1
    /// 2. Send only first 5 characters of hash
    /// 3. Check if full hash appears in response
    ///
    /// ## Returns
    /// - `Ok(true)` if password is compromised
    /// - `Ok(false)` if password is not found in breaches
    /// - `Err(_)` if API check failed (should be treated as non-blocking)
    pub async fn check_breach(&self) -> Result<bool, PasswordHashError> {
        let mut hasher = Sha1::new();
        hasher.update(self.as_bytes());
        let hash_hex = hex_encode_upper(&hasher.finalize());

        let (prefix, suffix) = hash_hex.split_at(5);

        let url = format!("{}{}", HIBP_API_URL, prefix);
        let response = reqwest::get(&url)
            .await
            .map_err(|e| PasswordHashError::BreachCheckFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PasswordHashError::BreachCheckFailed(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PasswordHashError::BreachCheckFailed(e.to_string()))?;

        // Format: SUFFIX:COUNT\r\n
        Ok(body.lines().any(|line| {
            line.split_once(':')
                .is_some_and(|(hash_suffix, _)| hash_suffix.eq_ignore_ascii_case(suffix))
        }))
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string embeds algorithm, version, cost parameters and salt, so a
/// hash stays verifiable after the configured parameters change.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse and validate a PHC string
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Wrap a value loaded from storage without validating it
    ///
    /// A corrupt value simply never verifies.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Argon2id hasher bound to one set of cost parameters and an optional pepper
///
/// Both `hash` and `verify` are CPU-bound and block for the full Argon2 run;
/// async callers must move them onto the blocking pool.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: HashParams,
    pepper: Option<Zeroizing<Vec<u8>>>,
    decoy: HashedPassword,
}

impl PasswordHasher {
    /// Build a hasher and precompute its decoy hash
    ///
    /// Construction runs one full hash, so build once at startup and share.
    pub fn new(params: HashParams, pepper: Option<Vec<u8>>) -> Result<Self, PasswordHashError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);
        let pepper = pepper.map(Zeroizing::new);

        let decoy_secret = Zeroizing::new(to_base64url(&random_bytes(32)));
        let pepper_bytes = pepper.as_ref().map(|p| p.as_slice());
        let decoy = hash_with(&argon2, &peppered(decoy_secret.as_bytes(), pepper_bytes))?;

        Ok(Self {
            argon2,
            params,
            pepper,
            decoy,
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let bytes = password.as_bytes();
        if bytes.is_empty() || bytes.len() > MAX_PLAINTEXT_BYTES {
            return Err(PasswordHashError::InvalidInput);
        }
        hash_with(&self.argon2, &peppered(bytes, self.pepper()))
    }

    /// Verify a password against a stored hash
    ///
    /// Uses the salt and parameters embedded in `hashed`. The final digest
    /// comparison inside `argon2` is constant-time. Never errors: a malformed
    /// hash is a mismatch.
    pub fn verify(&self, password: &ClearTextPassword, hashed: &HashedPassword) -> bool {
        self.verify_bytes(password.as_bytes(), hashed)
    }

    /// Run a full verification against the decoy hash and discard the result
    ///
    /// Called when no account matches, so that path takes as long as a real
    /// mismatch. `None` stands for input rejected before it became a
    /// [`ClearTextPassword`].
    pub fn verify_decoy(&self, candidate: Option<&ClearTextPassword>) {
        let candidate = candidate.map(ClearTextPassword::as_bytes).unwrap_or_default();
        let _ = self.verify_bytes(candidate, &self.decoy);
    }

    /// True when `hashed` was produced with other parameters or algorithm
    pub fn needs_rehash(&self, hashed: &HashedPassword) -> bool {
        let parsed = match PasswordHash::new(hashed.as_phc_string()) {
            Ok(h) => h,
            Err(_) => return true,
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(stored) => {
                stored.m_cost() != self.params.memory_kib
                    || stored.t_cost() != self.params.iterations
                    || stored.p_cost() != self.params.parallelism
            }
            Err(_) => true,
        }
    }

    pub fn params(&self) -> HashParams {
        self.params
    }

    fn pepper(&self) -> Option<&[u8]> {
        self.pepper.as_ref().map(|p| p.as_slice())
    }

    fn verify_bytes(&self, password: &[u8], hashed: &HashedPassword) -> bool {
        let parsed = match PasswordHash::new(hashed.as_phc_string()) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(&peppered(password, self.pepper()), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn peppered(password: &[u8], pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
    let mut combined = Zeroizing::new(password.to_vec());
    if let Some(p) = pepper {
        combined.extend_from_slice(p);
    }
    combined
}

fn hash_with(argon2: &Argon2<'_>, bytes: &[u8]) -> Result<HashedPassword, PasswordHashError> {
    // 128-bit random salt
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(bytes, &salt)
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

    Ok(HashedPassword {
        hash: hash.to_string(),
    })
}

/// Check for common weak patterns
fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // All same character (e.g., "aaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &[
        "qwerty",
        "qwertyuiop",
        "asdfgh",
        "asdfghjkl",
        "zxcvbn",
        "qazwsx",
        "1qaz2wsx",
    ];

    if KEYBOARD_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "12345678",
        "123456789",
        "1234567890",
        "abcdefgh",
        "letmein",
        "welcome",
        "admin123",
        "changeme",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
        "monkey",
        "shadow",
        "master",
        "dragon",
        "baseball",
        "trustno1",
    ];

    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Check if string is sequential numbers
fn is_sequential_numbers(s: &str) -> bool {
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() < 4 || digits.len() != s.chars().count() {
        return false;
    }

    let is_ascending = digits
        .windows(2)
        .all(|w| w[1] == w[0] + 1 || (w[0] == 9 && w[1] == 0));

    let is_descending = digits
        .windows(2)
        .all(|w| w[0] == w[1] + 1 || (w[0] == 0 && w[1] == 9));

    is_ascending || is_descending
}

fn hex_encode_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap parameters so the suite stays fast
    fn test_hasher() -> PasswordHasher {
        PasswordHasher::new(HashParams::new(1024, 1, 1), None).unwrap()
    }

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("short".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::TooShort { .. })));
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        let result = ClearTextPassword::new(long_password);
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("        ".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_common_pattern() {
        for weak in ["password123", "qwertyuiop", "12345678", "zzzzzzzzzz"] {
            let result = ClearTextPassword::new(weak.to_string());
            assert!(
                matches!(result, Err(PasswordPolicyError::CommonPattern)),
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_password() {
        assert!(ClearTextPassword::new("MySecure#Pass2024!".to_string()).is_ok());
        assert!(ClearTextPassword::new("パスワード安全です!".to_string()).is_ok());
    }

    #[test]
    fn test_for_verification_skips_policy() {
        // Too short for the policy, still accepted for verification
        assert!(ClearTextPassword::for_verification("abc".to_string()).is_ok());

        assert!(matches!(
            ClearTextPassword::for_verification(String::new()),
            Err(PasswordHashError::InvalidInput)
        ));
        assert!(matches!(
            ClearTextPassword::for_verification("x".repeat(MAX_PLAINTEXT_BYTES + 1)),
            Err(PasswordHashError::InvalidInput)
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = test_hasher();
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = hasher.hash(&password).unwrap();

        assert!(hasher.verify(&password, &hashed));

        let wrong_password = ClearTextPassword::new_unchecked("WrongPassword123!".to_string());
        assert!(!hasher.verify(&wrong_password, &hashed));
    }

    #[test]
    fn test_hash_rejects_invalid_input() {
        let hasher = test_hasher();
        let empty = ClearTextPassword::new_unchecked(String::new());
        assert!(matches!(
            hasher.hash(&empty),
            Err(PasswordHashError::InvalidInput)
        ));

        let oversized = ClearTextPassword::new_unchecked("x".repeat(MAX_PLAINTEXT_BYTES + 1));
        assert!(matches!(
            hasher.hash(&oversized),
            Err(PasswordHashError::InvalidInput)
        ));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = test_hasher();
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());

        let first = hasher.hash(&password).unwrap();
        let second = hasher.hash(&password).unwrap();

        assert_ne!(first.as_phc_string(), second.as_phc_string());
        assert!(hasher.verify(&password, &first));
        assert!(hasher.verify(&password, &second));
    }

    #[test]
    fn test_hash_with_pepper() {
        let peppered_hasher =
            PasswordHasher::new(HashParams::new(1024, 1, 1), Some(b"my_secret_pepper".to_vec()))
                .unwrap();
        let other_pepper =
            PasswordHasher::new(HashParams::new(1024, 1, 1), Some(b"wrong_pepper".to_vec()))
                .unwrap();
        let no_pepper = test_hasher();

        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = peppered_hasher.hash(&password).unwrap();

        assert!(peppered_hasher.verify(&password, &hashed));
        assert!(!no_pepper.verify(&password, &hashed));
        assert!(!other_pepper.verify(&password, &hashed));
    }

    #[test]
    fn test_peppered_decoy_rejects_everything() {
        let hasher =
            PasswordHasher::new(HashParams::new(1024, 1, 1), Some(b"pepper".to_vec())).unwrap();
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());

        assert!(!hasher.verify(&password, &hasher.decoy));
        hasher.verify_decoy(Some(&password));
        hasher.verify_decoy(None);
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        let hasher = test_hasher();
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());

        for corrupt in ["", "not_a_valid_hash", "$argon2id$v=19$m=1024,t=1,p=1$$"] {
            assert!(!hasher.verify(&password, &HashedPassword::from_stored(corrupt)));
        }
    }

    #[test]
    fn test_needs_rehash() {
        let old = PasswordHasher::new(HashParams::new(1024, 1, 1), None).unwrap();
        let current = PasswordHasher::new(HashParams::new(2048, 1, 1), None).unwrap();

        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = old.hash(&password).unwrap();

        assert!(!old.needs_rehash(&hashed));
        assert!(current.needs_rehash(&hashed));
        // Old hashes keep verifying under the new hasher
        assert!(current.verify(&password, &hashed));
        assert!(current.needs_rehash(&HashedPassword::from_stored("garbage")));
    }

    #[test]
    fn test_decoy_uses_configured_params() {
        let hasher = test_hasher();
        assert!(!hasher.needs_rehash(&hasher.decoy));
        hasher.verify_decoy(None);
        hasher.verify_decoy(Some(&ClearTextPassword::new_unchecked("guess".to_string())));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PasswordHasher::new(HashParams::new(1, 0, 1), None);
        assert!(matches!(result, Err(PasswordHashError::InvalidParams(_))));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let hasher = test_hasher();
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = hasher.hash(&password).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(hasher.verify(&password, &restored));
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new_unchecked("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));

        let hasher = test_hasher();
        let hashed = hasher.hash(&ClearTextPassword::new_unchecked("secret".to_string())).unwrap();
        assert!(!format!("{:?}", hashed).contains("argon2"));
    }

    #[test]
    fn test_hex_encode_upper() {
        let bytes = [0xab, 0xcd, 0xef];
        assert_eq!(hex_encode_upper(&bytes), "ABCDEF");
    }
}
