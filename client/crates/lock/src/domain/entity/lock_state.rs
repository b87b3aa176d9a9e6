//! Lock State Machine
//!
//! Per-device-session runtime state of the gate. Two states:
//! `Unlocked` and `Locked(method)`. Engaging is refused when no method is
//! configured; clearing happens only through successful verification.
//!
//! The state is ephemeral: it is rebuilt unlocked at cold start and only
//! the session-unlocked flag (stored separately) carries information
//! across mounts within a session.

use chrono::{DateTime, Utc};
use derive_more::Display;

use crate::domain::value_object::lock_method::LockMethod;

/// What engaged the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LockTrigger {
    /// Fresh launch with a configured method and no session flag
    #[display("launch")]
    Launch,
    /// Foreground check after backgrounding cleared the session flag
    #[display("backgrounded")]
    Backgrounded,
    /// Idle countdown elapsed
    #[display("idle_timeout")]
    IdleTimeout,
    /// Explicit lock request (e.g. a "lock now" control)
    #[display("manual")]
    Manual,
}

/// Current phase of the machine
#[derive(Debug, Clone, PartialEq)]
pub enum LockPhase {
    Unlocked,
    Locked {
        /// Method active for the current challenge (copied from the
        /// preference at lock time)
        method: LockMethod,
        /// Time the lock was engaged
        since: DateTime<Utc>,
        trigger: LockTrigger,
    },
}

/// Lock state machine
#[derive(Debug, Clone)]
pub struct LockState {
    phase: LockPhase,
    engaged_this_session: bool,
}

impl Default for LockState {
    fn default() -> Self {
        Self::new()
    }
}

impl LockState {
    /// Cold-start state: unlocked, never engaged
    pub fn new() -> Self {
        Self {
            phase: LockPhase::Unlocked,
            engaged_this_session: false,
        }
    }

    #[inline]
    pub fn phase(&self) -> &LockPhase {
        &self.phase
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        matches!(self.phase, LockPhase::Locked { .. })
    }

    /// Method of the active challenge, if locked
    pub fn active_method(&self) -> Option<LockMethod> {
        match &self.phase {
            LockPhase::Locked { method, .. } => Some(*method),
            LockPhase::Unlocked => None,
        }
    }

    /// Whether the machine has engaged at least once this session
    #[inline]
    pub fn engaged_this_session(&self) -> bool {
        self.engaged_this_session
    }

    /// Engage the lock
    ///
    /// Returns `true` when the transition happened. Refused (returns
    /// `false`) when no method is configured - the machine stays
    /// `Unlocked` permanently for such sessions - or when a challenge is
    /// already active.
    pub fn engage(&mut self, method: LockMethod, trigger: LockTrigger) -> bool {
        if !method.is_configured() {
            tracing::debug!("Engage refused: no lock method configured");
            return false;
        }

        if self.is_locked() {
            return false;
        }

        self.phase = LockPhase::Locked {
            method,
            since: Utc::now(),
            trigger,
        };
        self.engaged_this_session = true;
        true
    }

    /// Clear the lock after successful verification
    pub fn clear_on_unlock(&mut self) {
        self.phase = LockPhase::Unlocked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cold_start_is_unlocked() {
        let state = LockState::new();
        assert!(!state.is_locked());
        assert!(!state.engaged_this_session());
        assert_eq!(state.active_method(), None);
    }

    #[test]
    fn test_engage_with_configured_method() {
        let mut state = LockState::new();
        assert!(state.engage(LockMethod::Pin, LockTrigger::Launch));
        assert!(state.is_locked());
        assert_eq!(state.active_method(), Some(LockMethod::Pin));
        assert!(state.engaged_this_session());
    }

    #[test]
    fn test_engage_refused_without_method() {
        let mut state = LockState::new();
        assert!(!state.engage(LockMethod::None, LockTrigger::Launch));
        assert!(!state.is_locked());
        assert!(!state.engaged_this_session());
    }

    #[test]
    fn test_engage_refused_while_locked() {
        let mut state = LockState::new();
        assert!(state.engage(LockMethod::Pin, LockTrigger::Launch));
        // A second trigger does not replace the active challenge
        assert!(!state.engage(LockMethod::Biometric, LockTrigger::IdleTimeout));
        assert_eq!(state.active_method(), Some(LockMethod::Pin));
    }

    #[test]
    fn test_clear_on_unlock() {
        let mut state = LockState::new();
        state.engage(LockMethod::Password, LockTrigger::IdleTimeout);
        state.clear_on_unlock();
        assert!(!state.is_locked());
        // Session memory survives the unlock
        assert!(state.engaged_this_session());
    }

    #[test]
    fn test_relock_after_unlock() {
        let mut state = LockState::new();
        state.engage(LockMethod::Pin, LockTrigger::Launch);
        state.clear_on_unlock();
        assert!(state.engage(LockMethod::Pin, LockTrigger::IdleTimeout));
        match state.phase() {
            LockPhase::Locked { trigger, .. } => assert_eq!(*trigger, LockTrigger::IdleTimeout),
            LockPhase::Unlocked => panic!("expected locked"),
        }
    }
}
