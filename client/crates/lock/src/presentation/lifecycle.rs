//! App Lifecycle Signal
//!
//! Foreground/background transitions as reported by the hosting shell
//! (native app lifecycle or page visibility on web). The shell gate
//! subscribes to clear the session-unlocked flag on backgrounding.

use tokio::sync::broadcast;

/// Lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Foreground,
    Background,
}

/// Lifecycle broadcast
#[derive(Debug)]
pub struct AppLifecycle {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl Default for AppLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl AppLifecycle {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self { tx }
    }

    /// Publish a transition; a send with no subscribers is not an error
    pub fn emit(&self, event: LifecycleEvent) {
        tracing::debug!(?event, "App lifecycle transition");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}
