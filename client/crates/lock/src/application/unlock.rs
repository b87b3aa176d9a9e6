//! Unlock Use Case
//!
//! Verifies a credential against the configured lock method and, on
//! success, performs the three observable side effects in one place:
//! clear the state machine, set the session-unlocked flag, reset the
//! idle clock.
//!
//! Concurrent triggers (rapid PIN completion racing the auto-biometric
//! attempt) are serialized by an explicit in-flight guard; the loser is
//! told [`LockError::AttemptInProgress`] instead of double-verifying.
//! Consecutive failures are throttled by the configured policy.

use std::sync::Arc;

use platform::biometric::{BiometricError, BiometricGateway};
use platform::throttle::AttemptTracker;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::application::config::LockConfig;
use crate::application::idle::IdleMonitor;
use crate::application::session::LockSession;
use crate::domain::repository::{
    AuthGateway, LockPreferenceRepository, ProfileRepository, SessionFlagRepository,
};
use crate::domain::value_object::pin_code::{PinHash, RawPin};
use crate::error::{LockError, LockResult};

/// Unlock use case
pub struct UnlockUseCase<P, L, F, A, B>
where
    P: ProfileRepository,
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    A: AuthGateway,
    B: BiometricGateway,
{
    profile_repo: Arc<P>,
    device_repo: Arc<L>,
    flags: Arc<F>,
    auth: Arc<A>,
    biometric: Arc<B>,
    session: Arc<LockSession>,
    idle: IdleMonitor,
    attempts: AttemptTracker,
    in_flight: Mutex<()>,
}

impl<P, L, F, A, B> UnlockUseCase<P, L, F, A, B>
where
    P: ProfileRepository,
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    A: AuthGateway,
    B: BiometricGateway,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profile_repo: Arc<P>,
        device_repo: Arc<L>,
        flags: Arc<F>,
        auth: Arc<A>,
        biometric: Arc<B>,
        session: Arc<LockSession>,
        idle: IdleMonitor,
        config: &LockConfig,
    ) -> Self {
        Self {
            profile_repo,
            device_repo,
            flags,
            auth,
            biometric,
            session,
            idle,
            attempts: AttemptTracker::new(config.throttle.clone()),
            in_flight: Mutex::new(()),
        }
    }

    /// Verify a PIN
    ///
    /// Pre-login the locally cached hash is authoritative; once a session
    /// exists the remote profile record is, with the cache as fallback
    /// when the backend is unreachable.
    pub async fn unlock_with_pin(&self, pin: RawPin) -> LockResult<()> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| LockError::AttemptInProgress)?;

        self.check_throttle()?;

        let hash = self.resolve_pin_hash().await?;

        if hash.verify(&pin) {
            self.finish_unlock("pin").await;
            Ok(())
        } else {
            self.record_failure();
            Err(LockError::InvalidCredential)
        }
    }

    /// Verify the account password via a full sign-in attempt
    pub async fn unlock_with_password(&self, password: &str) -> LockResult<()> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| LockError::AttemptInProgress)?;

        self.check_throttle()?;

        let user = self
            .auth
            .current_user()
            .await?
            .ok_or(LockError::NotAuthenticated)?;

        match self.auth.sign_in_with_password(&user.email, password).await {
            Ok(()) => {
                self.finish_unlock("password").await;
                Ok(())
            }
            Err(LockError::InvalidCredential) => {
                self.record_failure();
                Err(LockError::InvalidCredential)
            }
            // Connectivity problems are not failed attempts
            Err(e) => Err(e),
        }
    }

    /// Run the platform biometric check
    pub async fn unlock_with_biometric(&self) -> LockResult<()> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| LockError::AttemptInProgress)?;

        self.check_throttle()?;

        if !self.biometric.is_available().await {
            return Err(LockError::BiometricUnavailable);
        }

        match self.biometric.verify("Unlock your vault").await {
            Ok(()) => {
                self.finish_unlock("biometric").await;
                Ok(())
            }
            Err(BiometricError::Rejected) => {
                self.record_failure();
                Err(LockError::InvalidCredential)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Failures recorded in the current throttle window (for UI hints)
    pub fn failed_attempts(&self) -> u32 {
        self.attempts.failed_count()
    }

    async fn resolve_pin_hash(&self) -> LockResult<PinHash> {
        let user = match self.auth.current_user().await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Auth state unavailable; using device PIN record");
                None
            }
        };

        match user {
            Some(user) => match self.profile_repo.find_lock_profile(&user.user_id).await {
                Ok(profile) => profile
                    .and_then(|p| p.pin_hash)
                    .ok_or(LockError::PinNotConfigured),
                Err(LockError::RemoteUnavailable(msg)) => {
                    tracing::warn!(message = %msg, "Profile record unreachable; using device PIN record");
                    self.local_pin_hash().await
                }
                Err(e) => Err(e),
            },
            None => self.local_pin_hash().await,
        }
    }

    async fn local_pin_hash(&self) -> LockResult<PinHash> {
        self.device_repo
            .find()
            .await?
            .and_then(|pref| pref.pin_hash().cloned())
            .ok_or(LockError::PinNotConfigured)
    }

    async fn finish_unlock(&self, method: &str) {
        self.attempts.reset();
        self.session.clear_on_unlock();

        // A failed flag write only costs an extra prompt later; the
        // unlock itself stands.
        if let Err(e) = self.flags.set_unlocked().await {
            tracing::warn!(error = %e, "Failed to persist session-unlocked flag");
        }

        self.idle.mark_active();

        tracing::info!(method, "App unlocked");
    }

    fn record_failure(&self) {
        if let Some(until) = self.attempts.record_failure() {
            tracing::warn!(
                retry_in_secs = until.saturating_duration_since(Instant::now()).as_secs(),
                "Unlock attempts exhausted; challenge throttled"
            );
        }
    }

    fn check_throttle(&self) -> LockResult<()> {
        self.attempts.check().map_err(|until| LockError::LockedOut {
            retry_in: until.saturating_duration_since(Instant::now()),
        })
    }
}
