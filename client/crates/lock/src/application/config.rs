//! Application Configuration
//!
//! Configuration for the lock application layer, plus the settings
//! broadcast that carries auto-lock changes to running monitors.

use std::time::Duration;

use tokio::sync::watch;

use crate::domain::value_object::idle_timeout::AutoLockTimeout;

/// Re-export ThrottlePolicy from platform
pub use platform::throttle::ThrottlePolicy;

/// Lock application configuration
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Device-store key for the cached lock preference
    pub preference_key: String,
    /// Device-store key for the auto-lock timeout
    pub auto_lock_key: String,
    /// Session-store key for the session-unlocked flag
    pub session_flag_key: String,
    /// Default auto-lock timeout for devices with no stored value
    /// (disabled: idle locking is opt-in)
    pub default_auto_lock: AutoLockTimeout,
    /// Failed-attempt policy for the unlock challenge
    pub throttle: ThrottlePolicy,
    /// Timeout applied to remote profile/auth calls
    pub remote_timeout: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            preference_key: "lock.preference".to_string(),
            auto_lock_key: "lock.auto_lock".to_string(),
            session_flag_key: "session.unlocked".to_string(),
            default_auto_lock: AutoLockTimeout::DISABLED,
            throttle: ThrottlePolicy::default(),
            remote_timeout: Duration::from_secs(10),
        }
    }
}

impl LockConfig {
    /// Create config for development (short lockout for manual testing)
    pub fn development() -> Self {
        Self {
            throttle: ThrottlePolicy::new(5, 30),
            ..Default::default()
        }
    }
}

/// Broadcast for auto-lock setting changes
///
/// Owned by the configuration module; every running [`IdleMonitor`]
/// subscribes so a changed timeout takes effect without a reload.
///
/// [`IdleMonitor`]: crate::application::idle::IdleMonitor
#[derive(Debug)]
pub struct SettingsBus {
    tx: watch::Sender<AutoLockTimeout>,
}

impl SettingsBus {
    pub fn new(initial: AutoLockTimeout) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Publish a new timeout to all subscribers
    pub fn publish(&self, timeout: AutoLockTimeout) {
        self.tx.send_replace(timeout);
        tracing::debug!(timeout = %timeout, "Auto-lock setting published");
    }

    /// Subscribe to timeout changes
    pub fn subscribe(&self) -> watch::Receiver<AutoLockTimeout> {
        self.tx.subscribe()
    }

    /// Current value
    pub fn current(&self) -> AutoLockTimeout {
        *self.tx.borrow()
    }
}
