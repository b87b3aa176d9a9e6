//! PIN Value Objects
//!
//! Domain value objects for the app-lock PIN. Delegates to
//! `platform::pin` for cryptographic operations.
//!
//! ## Usage
//! ```rust
//! use lock::domain::value_object::pin_code::{PinHash, RawPin};
//!
//! // Create from keypad input
//! let raw = RawPin::new("482913".to_string())?;
//!
//! // Hash for storage (device store + profile record)
//! let hashed = PinHash::from_raw(&raw)?;
//!
//! // Verify later
//! assert!(hashed.verify(&raw));
//! # Ok::<(), kernel::error::app_error::AppError>(())
//! ```

use kernel::error::app_error::{AppError, AppResult};
use platform::pin::{ClearTextPin, HashedPin, PinHashError, PinPolicyError};
use std::fmt;

// ============================================================================
// Raw PIN (Keypad input)
// ============================================================================

/// Raw PIN from keypad input
///
/// Wrapper around `ClearTextPin` with domain-specific error handling.
/// Memory is automatically zeroized when dropped.
pub struct RawPin(ClearTextPin);

impl RawPin {
    /// Create a new raw PIN with shape validation (exactly six digits)
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPin::new(raw).map_err(|e| match e {
            PinPolicyError::WrongLength { expected, actual } => AppError::invalid_input(format!(
                "PIN must be exactly {} digits (got {})",
                expected, actual
            ))
            .with_action("Please enter exactly six digits"),

            PinPolicyError::NonDigit => AppError::invalid_input("PIN may contain digits only")
                .with_action("Please use the number keys"),
        })?;

        Ok(Self(clear_text))
    }

    /// Access the inner ClearTextPin
    pub(crate) fn inner(&self) -> &ClearTextPin {
        &self.0
    }
}

impl fmt::Debug for RawPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPin").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// PIN Hash (for storage)
// ============================================================================

/// Hashed PIN for storage in the device store and profile record
///
/// Stores the PIN in Argon2id PHC string format. Safe to store and log.
#[derive(Clone, PartialEq, Eq)]
pub struct PinHash(HashedPin);

impl PinHash {
    /// Create from raw PIN by hashing
    pub fn from_raw(raw: &RawPin) -> AppResult<Self> {
        let hashed = raw.inner().hash().map_err(|e| match e {
            PinHashError::HashingFailed(msg) => {
                AppError::internal(format!("PIN hashing failed: {}", msg))
            }
            _ => AppError::internal("Unexpected error during PIN hashing"),
        })?;

        Ok(Self(hashed))
    }

    /// Create from PHC string (from the device store or profile record)
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        let hashed = HashedPin::from_phc_string(phc_string)
            .map_err(|_| AppError::internal("Invalid PIN hash in stored record"))?;

        Ok(Self(hashed))
    }

    /// Get PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw PIN against this hash
    ///
    /// Uses constant-time comparison to prevent timing attacks.
    pub fn verify(&self, raw: &RawPin) -> bool {
        self.0.verify(raw.inner())
    }

    /// Check if the hash uses outdated algorithm/parameters
    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinHash").field("hash", &"[HASH]").finish()
    }
}

impl fmt::Display for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[HASHED_PIN]")
    }
}

// ============================================================================
// Tests
// ============================================================================
