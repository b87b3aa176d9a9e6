//! PIN Hashing and Verification
//!
//! App-lock PIN handling with:
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of sensitive data
//! - Constant-time comparison
//!
//! ## Security Features
//! - Memory-hard hashing prevents offline brute force of the short code
//! - Zeroization prevents memory inspection attacks
//!
//! The PIN is deliberately validated on shape only (exactly six ASCII
//! digits). Users pick any six digits; throttling at the unlock layer is
//! what limits guessing, not code-quality rules.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Required PIN length in digits
pub const PIN_LENGTH: usize = 6;

// ============================================================================
// Error Types
// ============================================================================

/// PIN shape violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinPolicyError {
    /// PIN has the wrong number of digits
    #[error("PIN must be exactly {expected} digits (got {actual})")]
    WrongLength { expected: usize, actual: usize },

    /// PIN contains a non-digit character
    #[error("PIN may contain digits only")]
    NonDigit,
}

/// PIN hashing/verification errors
#[derive(Debug, Error)]
pub enum PinHashError {
    /// Hashing operation failed
    #[error("PIN hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid PIN hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text PIN (Zeroized on drop)
// ============================================================================

/// Clear text PIN with automatic memory zeroization
///
/// This type ensures that PIN data is securely erased from memory
/// when the value is dropped, preventing memory inspection attacks.
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPin(String);

impl ClearTextPin {
    /// Create a new clear text PIN with shape validation
    ///
    /// Accepts exactly [`PIN_LENGTH`] ASCII digits, nothing else.
    pub fn new(raw: String) -> Result<Self, PinPolicyError> {
        if raw.chars().any(|c| !c.is_ascii_digit()) {
            return Err(PinPolicyError::NonDigit);
        }

        let digit_count = raw.chars().count();
        if digit_count != PIN_LENGTH {
            return Err(PinPolicyError::WrongLength {
                expected: PIN_LENGTH,
                actual: digit_count,
            });
        }

        Ok(Self(raw))
    }

    /// Get the PIN as bytes for hashing
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the PIN using Argon2id
    ///
    /// ## Returns
    /// PHC-formatted hash string wrapped in `HashedPin`
    pub fn hash(&self) -> Result<HashedPin, PinHashError> {
        // Generate random salt (128 bits = 16 bytes)
        let salt = SaltString::generate(OsRng);

        // OWASP recommended Argon2id parameters:
        // m=19456 (19 MiB), t=2, p=1
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(self.as_bytes(), &salt)
            .map_err(|e| PinHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPin {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPin").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Hashed PIN (Safe to store)
// ============================================================================

/// Hashed PIN in PHC string format
///
/// This type stores the Argon2id hash in PHC format, which includes:
/// - Algorithm identifier
/// - Version
/// - Parameters (memory, iterations, parallelism)
/// - Salt
/// - Hash
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPin {
    hash: String,
}

impl HashedPin {
    /// Create from PHC string (e.g., from the device store or profile record)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PinHashError> {
        let hash = s.into();

        // Validate it's a valid PHC string
        PasswordHash::new(&hash).map_err(|_| PinHashError::InvalidHashFormat)?;

        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a PIN against this hash
    ///
    /// Uses constant-time comparison to prevent timing attacks.
    pub fn verify(&self, pin: &ClearTextPin) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        let argon2 = Argon2::default();

        // Argon2 uses constant-time comparison internally
        argon2.verify_password(pin.as_bytes(), &parsed_hash).is_ok()
    }

    /// Check if the hash needs to be rehashed (e.g., parameters changed)
    ///
    /// Returns true if the hash uses outdated parameters
    pub fn needs_rehash(&self) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return true,
        };

        // Check if algorithm is Argon2id
        if parsed_hash.algorithm != argon2::Algorithm::Argon2id.ident() {
            return true;
        }

        // Could add parameter version checking here
        false
    }
}

impl fmt::Debug for HashedPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPin").field("hash", &"[HASH]").finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
