//! Route Guard and App Shell Gate
//!
//! Gating glue with two call sites and distinct policies:
//! - [`AppShellGate`] wraps the whole shell before authentication:
//!   session flag, then device cache, plus lifecycle handling that clears
//!   the flag on backgrounding.
//! - [`RouteGuard`] wraps protected routes after authentication: state
//!   machine first, engaging on first open or re-foreground, and arms the
//!   idle clock only when a method and a nonzero timeout are configured.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::application::check_gate::CheckGateUseCase;
use crate::application::config::SettingsBus;
use crate::application::idle::IdleMonitor;
use crate::application::session::{GatePhase, LockSession};
use crate::domain::entity::lock_state::LockTrigger;
use crate::domain::repository::{
    AuthUser, LockPreferenceRepository, ProfileRepository, SessionFlagRepository,
};
use crate::domain::value_object::lock_method::LockMethod;
use crate::presentation::lifecycle::{AppLifecycle, LifecycleEvent};

/// Authentication state as the route tree sees it
#[derive(Debug, Clone)]
pub enum AuthSnapshot {
    /// Auth provider still resolving; render neither content nor gate
    Resolving,
    SignedOut,
    SignedIn(AuthUser),
}

/// Per-navigation gating decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Neutral loading indicator (no flash of locked/unlocked UI)
    Loading,
    /// Not signed in: leave the protected tree entirely
    RedirectToSignIn,
    /// Block rendering behind the challenge
    ShowGate(LockMethod),
    /// Render protected content
    Render,
}

/// Post-authentication route guard
pub struct RouteGuard<L, F, P>
where
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    P: ProfileRepository,
{
    check: Arc<CheckGateUseCase<L, F, P>>,
    session: Arc<LockSession>,
    settings: Arc<SettingsBus>,
    idle: IdleMonitor,
}

impl<L, F, P> RouteGuard<L, F, P>
where
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    P: ProfileRepository,
{
    pub fn new(
        check: Arc<CheckGateUseCase<L, F, P>>,
        session: Arc<LockSession>,
        settings: Arc<SettingsBus>,
        idle: IdleMonitor,
    ) -> Self {
        Self {
            check,
            session,
            settings,
            idle,
        }
    }

    /// Decide what to render for a navigation
    pub async fn decide(&self, auth: AuthSnapshot) -> GateDecision {
        match auth {
            AuthSnapshot::Resolving => GateDecision::Loading,
            AuthSnapshot::SignedOut => {
                // No authenticated session: the idle clock must not run
                self.idle.stop();
                GateDecision::RedirectToSignIn
            }
            AuthSnapshot::SignedIn(user) => {
                let route = self.check.evaluate_route(&user).await;

                if let Some(method) = route.show_gate {
                    return GateDecision::ShowGate(method);
                }

                self.arm_idle(route.configured);
                GateDecision::Render
            }
        }
    }

    /// Forwarded input activity (pointer, key, touch, scroll, wheel)
    pub fn record_activity(&self) {
        self.idle.record_activity();
    }

    /// Observe phase changes (idle locks re-render the gate through this)
    pub fn subscribe_phase(&self) -> watch::Receiver<GatePhase> {
        self.session.subscribe()
    }

    /// Idle locking is active iff a method is configured, the timeout is
    /// nonzero, and the user is authenticated (which `decide` ensured)
    fn arm_idle(&self, configured: Option<LockMethod>) {
        let Some(method) = configured else {
            return;
        };
        if !self.settings.current().is_enabled() {
            return;
        }

        let session = self.session.clone();
        self.idle.start(Arc::new(move || {
            session.engage(method, LockTrigger::IdleTimeout);
        }));
    }
}

/// Pre-authentication shell gate
pub struct AppShellGate<L, F, P>
where
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    P: ProfileRepository,
{
    check: Arc<CheckGateUseCase<L, F, P>>,
    flags: Arc<F>,
    lifecycle: Arc<AppLifecycle>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl<L, F, P> AppShellGate<L, F, P>
where
    L: LockPreferenceRepository,
    F: SessionFlagRepository + Send + Sync + 'static,
    P: ProfileRepository,
{
    pub fn new(
        check: Arc<CheckGateUseCase<L, F, P>>,
        flags: Arc<F>,
        lifecycle: Arc<AppLifecycle>,
    ) -> Self {
        Self {
            check,
            flags,
            lifecycle,
            watcher: Mutex::new(None),
        }
    }

    /// Decide what the shell renders on mount/foreground
    pub async fn decide(&self) -> GateDecision {
        match self.check.evaluate_shell().await {
            Some(method) => GateDecision::ShowGate(method),
            None => GateDecision::Render,
        }
    }

    /// Subscribe to lifecycle transitions; backgrounding clears the
    /// session-unlocked flag so the next foreground re-checks the gate
    pub fn watch_lifecycle(&self) {
        let mut watcher = self.watcher.lock().expect("lifecycle watcher poisoned");

        if let Some(handle) = watcher.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }

        let mut rx = self.lifecycle.subscribe();
        let flags = self.flags.clone();

        *watcher = Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(LifecycleEvent::Background) => {
                        if let Err(e) = flags.clear().await {
                            tracing::warn!(error = %e, "Failed to clear session flag on background");
                        } else {
                            tracing::debug!("Session flag cleared on background");
                        }
                    }
                    Ok(LifecycleEvent::Foreground) => {
                        // The shell re-runs decide() on foreground
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Lifecycle watcher lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }

    /// Detach the lifecycle watcher
    pub fn stop(&self) {
        if let Some(handle) = self
            .watcher
            .lock()
            .expect("lifecycle watcher poisoned")
            .take()
        {
            handle.abort();
        }
    }
}
