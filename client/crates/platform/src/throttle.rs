//! Failed-Attempt Throttling
//!
//! Counter-based lockout for credential challenges: after a run of
//! consecutive failures the challenge is refused for a fixed cooldown.
//! Tracked in memory only; a process restart clears the counter, which is
//! acceptable because the lock gate itself still stands.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Throttle configuration
#[derive(Debug, Clone)]
pub struct ThrottlePolicy {
    /// Consecutive failures allowed before lockout
    pub max_attempts: u32,
    /// Cooldown applied once the limit is reached
    pub lockout: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout: Duration::from_secs(300),
        }
    }
}

impl ThrottlePolicy {
    pub fn new(max_attempts: u32, lockout_secs: u64) -> Self {
        Self {
            max_attempts,
            lockout: Duration::from_secs(lockout_secs),
        }
    }
}

#[derive(Debug, Default)]
struct AttemptState {
    failed_count: u32,
    locked_until: Option<Instant>,
}

/// In-memory consecutive-failure tracker
#[derive(Debug)]
pub struct AttemptTracker {
    policy: ThrottlePolicy,
    state: Mutex<AttemptState>,
}

impl AttemptTracker {
    pub fn new(policy: ThrottlePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(AttemptState::default()),
        }
    }

    /// Check whether an attempt may proceed
    ///
    /// Returns `Err(locked_until)` while the cooldown is active. An
    /// expired cooldown clears the counter.
    pub fn check(&self) -> Result<(), Instant> {
        let mut state = self.state.lock().expect("attempt tracker poisoned");

        if let Some(until) = state.locked_until {
            if Instant::now() < until {
                return Err(until);
            }
            // Cooldown expired: start a fresh window
            state.failed_count = 0;
            state.locked_until = None;
        }

        Ok(())
    }

    /// Record a failed attempt
    ///
    /// Returns the lockout deadline when this failure tripped the limit.
    pub fn record_failure(&self) -> Option<Instant> {
        let mut state = self.state.lock().expect("attempt tracker poisoned");

        state.failed_count += 1;
        if state.failed_count >= self.policy.max_attempts {
            let until = Instant::now() + self.policy.lockout;
            state.locked_until = Some(until);
            return Some(until);
        }

        None
    }

    /// Reset the counter after a successful attempt
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("attempt tracker poisoned");
        state.failed_count = 0;
        state.locked_until = None;
    }

    /// Failures recorded in the current window
    pub fn failed_count(&self) -> u32 {
        self.state
            .lock()
            .expect("attempt tracker poisoned")
            .failed_count
    }
}
