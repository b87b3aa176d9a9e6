//! Lock Preference Entity
//!
//! The user's chosen lock method plus the PIN hash when the method is
//! PIN. Stored remotely on the profile record and cached locally on the
//! device so the gate can run before authentication.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{lock_method::LockMethod, pin_code::PinHash};

/// Lock preference entity
///
/// Invariant: `pin_hash` is present iff `method` is [`LockMethod::Pin`].
/// Constructors enforce it; there is no way to build a mismatched pair.
#[derive(Debug, Clone)]
pub struct LockPreference {
    method: LockMethod,
    pin_hash: Option<PinHash>,
    /// Last change timestamp
    pub updated_at: DateTime<Utc>,
}

impl LockPreference {
    /// No lock configured
    pub fn none() -> Self {
        Self {
            method: LockMethod::None,
            pin_hash: None,
            updated_at: Utc::now(),
        }
    }

    /// PIN lock with its stored hash
    pub fn with_pin(pin_hash: PinHash) -> Self {
        Self {
            method: LockMethod::Pin,
            pin_hash: Some(pin_hash),
            updated_at: Utc::now(),
        }
    }

    /// Biometric lock
    pub fn biometric() -> Self {
        Self {
            method: LockMethod::Biometric,
            pin_hash: None,
            updated_at: Utc::now(),
        }
    }

    /// Account-password lock
    pub fn password() -> Self {
        Self {
            method: LockMethod::Password,
            pin_hash: None,
            updated_at: Utc::now(),
        }
    }

    /// Rebuild from stored parts, rejecting mismatched records
    pub fn from_parts(method: LockMethod, pin_hash: Option<PinHash>) -> Option<Self> {
        match (method, &pin_hash) {
            (LockMethod::Pin, Some(_)) | (LockMethod::None, None) => {}
            (LockMethod::Biometric, None) | (LockMethod::Password, None) => {}
            _ => return None,
        }

        Some(Self {
            method,
            pin_hash,
            updated_at: Utc::now(),
        })
    }

    #[inline]
    pub fn method(&self) -> LockMethod {
        self.method
    }

    #[inline]
    pub fn pin_hash(&self) -> Option<&PinHash> {
        self.pin_hash.as_ref()
    }

    /// Whether the gate must challenge before rendering content
    #[inline]
    pub fn requires_gate(&self) -> bool {
        self.method.is_configured()
    }

    /// Reset to no lock, dropping the PIN hash
    pub fn disable(&mut self) {
        self.method = LockMethod::None;
        self.pin_hash = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::pin_code::RawPin;

    fn pin_hash() -> PinHash {
        let raw = RawPin::new("482913".to_string()).unwrap();
        PinHash::from_raw(&raw).unwrap()
    }

    #[test]
    fn test_constructors_uphold_invariant() {
        assert_eq!(LockPreference::none().method(), LockMethod::None);
        assert!(LockPreference::none().pin_hash().is_none());

        let pref = LockPreference::with_pin(pin_hash());
        assert_eq!(pref.method(), LockMethod::Pin);
        assert!(pref.pin_hash().is_some());

        assert!(LockPreference::biometric().pin_hash().is_none());
        assert!(LockPreference::password().pin_hash().is_none());
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        assert!(LockPreference::from_parts(LockMethod::Pin, None).is_none());
        assert!(LockPreference::from_parts(LockMethod::Biometric, Some(pin_hash())).is_none());
        assert!(LockPreference::from_parts(LockMethod::None, Some(pin_hash())).is_none());

        assert!(LockPreference::from_parts(LockMethod::Pin, Some(pin_hash())).is_some());
        assert!(LockPreference::from_parts(LockMethod::Password, None).is_some());
    }

    #[test]
    fn test_requires_gate() {
        assert!(!LockPreference::none().requires_gate());
        assert!(LockPreference::biometric().requires_gate());
    }

    #[test]
    fn test_disable_drops_hash() {
        let mut pref = LockPreference::with_pin(pin_hash());
        pref.disable();
        assert_eq!(pref.method(), LockMethod::None);
        assert!(pref.pin_hash().is_none());
    }
}
