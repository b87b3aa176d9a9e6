//! Lock Session Service
//!
//! Shared holder of the [`LockState`] machine for one device session.
//! Guards observe phase changes through a watch channel instead of
//! polling, so an idle-triggered lock re-renders the gate immediately.

use std::sync::Mutex;

use tokio::sync::watch;

use crate::domain::entity::lock_state::{LockState, LockTrigger};
use crate::domain::value_object::lock_method::LockMethod;

/// Observable snapshot of the machine, published to guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Unlocked,
    Locked(LockMethod),
}

/// Shared lock-state holder
#[derive(Debug)]
pub struct LockSession {
    state: Mutex<LockState>,
    tx: watch::Sender<GatePhase>,
}

impl Default for LockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LockSession {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(GatePhase::Unlocked);
        Self {
            state: Mutex::new(LockState::new()),
            tx,
        }
    }

    /// Engage the lock; returns whether a transition happened
    pub fn engage(&self, method: LockMethod, trigger: LockTrigger) -> bool {
        let mut state = self.state.lock().expect("lock state poisoned");
        let engaged = state.engage(method, trigger);
        if engaged {
            self.tx.send_replace(GatePhase::Locked(method));
            tracing::info!(method = %method, trigger = %trigger, "App locked");
        }
        engaged
    }

    /// Clear the lock after successful verification
    pub fn clear_on_unlock(&self) {
        let mut state = self.state.lock().expect("lock state poisoned");
        state.clear_on_unlock();
        self.tx.send_replace(GatePhase::Unlocked);
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock().expect("lock state poisoned").is_locked()
    }

    pub fn active_method(&self) -> Option<LockMethod> {
        self.state
            .lock()
            .expect("lock state poisoned")
            .active_method()
    }

    pub fn engaged_this_session(&self) -> bool {
        self.state
            .lock()
            .expect("lock state poisoned")
            .engaged_this_session()
    }

    /// Subscribe to phase changes
    pub fn subscribe(&self) -> watch::Receiver<GatePhase> {
        self.tx.subscribe()
    }

    /// Current phase snapshot
    pub fn phase(&self) -> GatePhase {
        *self.tx.borrow()
    }
}
