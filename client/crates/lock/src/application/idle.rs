//! Idle Monitor
//!
//! One activity-reset countdown per process. The UI shell forwards input
//! events (pointer, key, touch, scroll, wheel) as `record_activity`;
//! when the configured timeout elapses uninterrupted the callback fires
//! exactly once and the monitor goes dormant until `mark_active` or a
//! fresh `start`.
//!
//! The monitor is a cloneable handle around one shared task, so the
//! pre-login and post-login gates share a single idle clock instead of
//! racing two timers. Reconfiguration arrives through the settings watch
//! channel; a published change re-arms the countdown from the new value
//! without a restart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

use crate::domain::value_object::idle_timeout::AutoLockTimeout;

/// Callback invoked when the countdown elapses
pub type IdleCallback = Arc<dyn Fn() + Send + Sync>;

/// Cloneable handle to the process-wide idle clock
#[derive(Clone)]
pub struct IdleMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    settings: watch::Receiver<AutoLockTimeout>,
    activity: Notify,
    dormant: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl IdleMonitor {
    /// Create the monitor, subscribed to the settings bus
    pub fn new(settings: watch::Receiver<AutoLockTimeout>) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                settings,
                activity: Notify::new(),
                dormant: AtomicBool::new(false),
                task: Mutex::new(None),
            }),
        }
    }

    /// Start observing; idempotent while a task is running
    ///
    /// With a disabled timeout no countdown is armed; the task waits for
    /// a settings change only.
    pub fn start(&self, on_idle: IdleCallback) {
        let mut task = self.inner.task.lock().expect("idle task slot poisoned");

        if let Some(handle) = task.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }

        self.inner.dormant.store(false, Ordering::SeqCst);
        let inner = self.inner.clone();
        *task = Some(tokio::spawn(run(inner, on_idle)));
    }

    /// Reset the countdown on observed user activity
    ///
    /// Ignored while dormant: input events never un-dormant the monitor,
    /// only [`mark_active`](Self::mark_active) does.
    pub fn record_activity(&self) {
        if self.inner.dormant.load(Ordering::SeqCst) {
            return;
        }
        self.inner.activity.notify_one();
    }

    /// Reset the countdown and leave dormancy; called after a successful
    /// unlock
    ///
    /// Idempotent: repeated calls restate the same full deadline.
    pub fn mark_active(&self) {
        self.inner.dormant.store(false, Ordering::SeqCst);
        self.inner.activity.notify_one();
    }

    /// Detach the observer task
    pub fn stop(&self) {
        if let Some(handle) = self
            .inner
            .task
            .lock()
            .expect("idle task slot poisoned")
            .take()
        {
            handle.abort();
        }
    }

    /// Whether an observer task is active
    pub fn is_running(&self) -> bool {
        self.inner
            .task
            .lock()
            .expect("idle task slot poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Whether the countdown already fired and awaits a reset
    pub fn is_dormant(&self) -> bool {
        self.inner.dormant.load(Ordering::SeqCst)
    }
}

async fn run(inner: Arc<MonitorInner>, on_idle: IdleCallback) {
    let mut settings = inner.settings.clone();

    loop {
        let timeout = *settings.borrow_and_update();

        if inner.dormant.load(Ordering::SeqCst) || !timeout.is_enabled() {
            // Nothing to count down; wait for a reset or a new setting
            tokio::select! {
                _ = inner.activity.notified() => {}
                changed = settings.changed() => {
                    if changed.is_err() {
                        // Settings bus gone: the session is tearing down
                        return;
                    }
                }
            }
            continue;
        }

        let duration = timeout.as_duration().expect("enabled timeout has a duration");

        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                inner.dormant.store(true, Ordering::SeqCst);
                tracing::info!(secs = timeout.secs(), "Idle timeout elapsed");
                on_idle();
            }
            _ = inner.activity.notified() => {
                // Reset: loop re-arms a full countdown
            }
            changed = settings.changed() => {
                if changed.is_err() {
                    return;
                }
                // Loop re-arms from the new value immediately
            }
        }
    }
}
