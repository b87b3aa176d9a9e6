//! Auto-Lock Timeout Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Idle duration after which the app re-locks
///
/// Zero disables idle-based locking regardless of the configured lock
/// method. Persisted per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutoLockTimeout(u32);

impl AutoLockTimeout {
    /// Idle locking disabled
    pub const DISABLED: Self = Self(0);

    #[inline]
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    #[inline]
    pub const fn secs(&self) -> u32 {
        self.0
    }

    /// Whether idle-based locking is active for this value
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.0 > 0
    }

    /// Countdown duration; `None` when disabled
    #[inline]
    pub fn as_duration(&self) -> Option<Duration> {
        if self.is_enabled() {
            Some(Duration::from_secs(u64::from(self.0)))
        } else {
            None
        }
    }
}

impl fmt::Display for AutoLockTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_enabled() {
            write!(f, "{}s", self.0)
        } else {
            f.write_str("disabled")
        }
    }
}
