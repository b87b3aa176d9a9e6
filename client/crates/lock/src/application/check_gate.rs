//! Check Gate Use Case
//!
//! Evaluates whether the gate must challenge before rendering content.
//! Two call sites with distinct policies: the pre-login app shell (local
//! preference only) and post-login protected routes (remote preference,
//! engaging the state machine on first open and on re-foregrounding).

use std::sync::Arc;

use crate::application::session::LockSession;
use crate::domain::entity::lock_state::LockTrigger;
use crate::domain::repository::{
    AuthUser, LockPreferenceRepository, ProfileRepository, SessionFlagRepository,
};
use crate::domain::value_object::lock_method::LockMethod;
use crate::error::LockError;

/// Route gate evaluation output
pub struct RouteCheck {
    /// Challenge to show before rendering, if any
    pub show_gate: Option<LockMethod>,
    /// Configured method regardless of the gate decision (drives idle
    /// arming)
    pub configured: Option<LockMethod>,
}

/// Check gate use case
pub struct CheckGateUseCase<L, F, P>
where
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    P: ProfileRepository,
{
    device_repo: Arc<L>,
    flags: Arc<F>,
    profile_repo: Arc<P>,
    session: Arc<LockSession>,
}

impl<L, F, P> CheckGateUseCase<L, F, P>
where
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    P: ProfileRepository,
{
    pub fn new(
        device_repo: Arc<L>,
        flags: Arc<F>,
        profile_repo: Arc<P>,
        session: Arc<LockSession>,
    ) -> Self {
        Self {
            device_repo,
            flags,
            profile_repo,
            session,
        }
    }

    /// Pre-login shell check
    ///
    /// Consults only session flag and device cache; no authenticated
    /// session exists yet.
    pub async fn evaluate_shell(&self) -> Option<LockMethod> {
        if self.session_unlocked().await {
            return None;
        }

        self.local_method().await.filter(LockMethod::is_configured)
    }

    /// Post-login route check
    ///
    /// Engages the machine when a configured method meets a session with
    /// no unlocked flag - fresh launch or foreground after backgrounding.
    pub async fn evaluate_route(&self, user: &AuthUser) -> RouteCheck {
        if self.session.is_locked() {
            let method = self.session.active_method();
            return RouteCheck {
                show_gate: method,
                configured: method,
            };
        }

        let configured = self.configured_method(user).await;

        let Some(method) = configured else {
            return RouteCheck {
                show_gate: None,
                configured: None,
            };
        };

        if self.session_unlocked().await {
            return RouteCheck {
                show_gate: None,
                configured,
            };
        }

        let trigger = if self.session.engaged_this_session() {
            LockTrigger::Backgrounded
        } else {
            LockTrigger::Launch
        };
        self.session.engage(method, trigger);

        RouteCheck {
            show_gate: Some(method),
            configured,
        }
    }

    /// Configured method for the signed-in user
    ///
    /// Remote record is authoritative; the device cache steps in when
    /// the backend is unreachable. Errors degrade to "no method" with a
    /// warning - a broken store must not brick the app.
    pub async fn configured_method(&self, user: &AuthUser) -> Option<LockMethod> {
        match self.profile_repo.find_lock_profile(&user.user_id).await {
            Ok(profile) => profile
                .map(|p| p.method)
                .filter(LockMethod::is_configured),
            Err(LockError::RemoteUnavailable(msg)) => {
                tracing::warn!(message = %msg, "Profile record unreachable; using device cache");
                self.local_method().await.filter(LockMethod::is_configured)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Lock profile unreadable; using device cache");
                self.local_method().await.filter(LockMethod::is_configured)
            }
        }
    }

    async fn session_unlocked(&self) -> bool {
        match self.flags.is_unlocked().await {
            Ok(unlocked) => unlocked,
            Err(e) => {
                tracing::warn!(error = %e, "Session flag unreadable; treating session as fresh");
                false
            }
        }
    }

    async fn local_method(&self) -> Option<LockMethod> {
        match self.device_repo.find().await {
            Ok(preference) => preference.map(|p| p.method()),
            Err(e) => {
                tracing::warn!(error = %e, "Lock preference unreadable; treating as absent");
                None
            }
        }
    }
}
