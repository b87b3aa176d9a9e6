use serde::{Deserialize, Serialize};
use std::fmt;

/// Credential type required to unlock the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockMethod {
    /// No app lock configured
    #[default]
    None,
    /// Six-digit PIN, verified against a stored hash
    Pin,
    /// Platform biometric check
    Biometric,
    /// Account password, verified through the auth provider
    Password,
}

impl LockMethod {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            LockMethod::None => "none",
            LockMethod::Pin => "pin",
            LockMethod::Biometric => "biometric",
            LockMethod::Password => "password",
        }
    }

    /// Parse a stored code
    ///
    /// Stored strings can be stale or hand-edited; unknown codes degrade
    /// to `Option::None` instead of panicking.
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "none" => Some(LockMethod::None),
            "pin" => Some(LockMethod::Pin),
            "biometric" => Some(LockMethod::Biometric),
            "password" => Some(LockMethod::Password),
            _ => None,
        }
    }

    /// Whether this method gates the app at all
    #[inline]
    pub const fn is_configured(&self) -> bool {
        !matches!(self, LockMethod::None)
    }
}

impl fmt::Display for LockMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
