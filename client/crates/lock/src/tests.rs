//! Scenario tests for the lock crate
//!
//! End-to-end wiring of the gate decisions, unlock flows, idle
//! re-locking, settings propagation, and attempt throttling, with all
//! external collaborators replaced by the in-memory implementations.

use std::sync::Arc;
use std::time::Duration;

use kernel::id::UserId;
use platform::device::{DeviceIdentity, RuntimePlatform};
use platform::keyvalue::MemoryStore;
use platform::throttle::ThrottlePolicy;

use crate::application::check_gate::CheckGateUseCase;
use crate::application::config::{LockConfig, SettingsBus};
use crate::application::disable_lock::DisableLockUseCase;
use crate::application::enable_lock::{EnableLockInput, EnableLockUseCase};
use crate::application::idle::IdleMonitor;
use crate::application::session::{GatePhase, LockSession};
use crate::application::unlock::UnlockUseCase;
use crate::application::update_auto_lock::UpdateAutoLockUseCase;
use crate::domain::repository::{AuthUser, LockPreferenceRepository, SessionFlagRepository};
use crate::domain::value_object::idle_timeout::AutoLockTimeout;
use crate::domain::value_object::lock_method::LockMethod;
use crate::domain::value_object::pin_code::RawPin;
use crate::error::LockError;
use crate::infra::local::{DeviceStore, SessionFlags};
use crate::infra::memory::{InMemoryAuthGateway, InMemoryProfileRepository, ScriptedBiometrics};
use crate::presentation::gate::{GateEvent, LockGate};
use crate::presentation::guard::{AppShellGate, AuthSnapshot, GateDecision, RouteGuard};
use crate::presentation::lifecycle::{AppLifecycle, LifecycleEvent};

type Device = DeviceStore<MemoryStore>;
type Flags = SessionFlags<MemoryStore>;
type Profiles = InMemoryProfileRepository;
type Unlock = UnlockUseCase<Profiles, Device, Flags, InMemoryAuthGateway, ScriptedBiometrics>;
type Gate = LockGate<Profiles, Device, Flags, InMemoryAuthGateway, ScriptedBiometrics>;

struct Harness {
    device_repo: Arc<Device>,
    flags: Arc<Flags>,
    profile_repo: Arc<Profiles>,
    auth: Arc<InMemoryAuthGateway>,
    biometric: Arc<ScriptedBiometrics>,
    session: Arc<LockSession>,
    settings: Arc<SettingsBus>,
    idle: IdleMonitor,
    unlock: Arc<Unlock>,
    guard: RouteGuard<Device, Flags, Profiles>,
    shell: AppShellGate<Device, Flags, Profiles>,
    lifecycle: Arc<AppLifecycle>,
}

impl Harness {
    async fn new(auto_lock: AutoLockTimeout) -> Self {
        Self::with_config(auto_lock, LockConfig::default()).await
    }

    async fn with_config(auto_lock: AutoLockTimeout, config: LockConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let session_store = Arc::new(MemoryStore::new());
        let config = Arc::new(config);

        let identity = DeviceIdentity::load_or_create(store.as_ref(), RuntimePlatform::Native)
            .await
            .unwrap();

        let device_repo = Arc::new(DeviceStore::new(store, config.clone(), &identity));
        let flags = Arc::new(SessionFlags::new(session_store, config.clone()));
        let profile_repo = Arc::new(InMemoryProfileRepository::new());
        let auth = Arc::new(InMemoryAuthGateway::new());
        let biometric = Arc::new(ScriptedBiometrics::new(true));
        let session = Arc::new(LockSession::new());
        let settings = Arc::new(SettingsBus::new(auto_lock));
        let idle = IdleMonitor::new(settings.subscribe());

        let unlock = Arc::new(UnlockUseCase::new(
            profile_repo.clone(),
            device_repo.clone(),
            flags.clone(),
            auth.clone(),
            biometric.clone(),
            session.clone(),
            idle.clone(),
            &config,
        ));

        let check = Arc::new(CheckGateUseCase::new(
            device_repo.clone(),
            flags.clone(),
            profile_repo.clone(),
            session.clone(),
        ));

        let guard = RouteGuard::new(
            check.clone(),
            session.clone(),
            settings.clone(),
            idle.clone(),
        );

        let lifecycle = Arc::new(AppLifecycle::new());
        let shell = AppShellGate::new(check, flags.clone(), lifecycle.clone());

        Self {
            device_repo,
            flags,
            profile_repo,
            auth,
            biometric,
            session,
            settings,
            idle,
            unlock,
            guard,
            shell,
            lifecycle,
        }
    }

    fn signed_in_user(&self) -> AuthUser {
        let user = AuthUser {
            user_id: UserId::new(),
            email: "owner@example.com".to_string(),
        };
        self.auth.sign_in_as(user.clone(), "CorrectHorse9!");
        user
    }

    async fn enable(&self, user: &AuthUser, input: EnableLockInput) {
        EnableLockUseCase::new(self.profile_repo.clone(), self.device_repo.clone())
            .execute(user, input)
            .await
            .unwrap();
    }

    async fn enable_pin(&self, user: &AuthUser, pin: &str) {
        self.enable(
            user,
            EnableLockInput {
                method: LockMethod::Pin,
                pin: Some(RawPin::new(pin.to_string()).unwrap()),
            },
        )
        .await;
    }

    fn pin_gate(&self) -> Gate {
        LockGate::new(LockMethod::Pin, self.unlock.clone()).unwrap()
    }

    fn raw_pin(pin: &str) -> RawPin {
        RawPin::new(pin.to_string()).unwrap()
    }
}

async fn type_pin(gate: &Gate, pin: &str) -> GateEvent {
    let mut last = GateEvent::Digits(0);
    for digit in pin.chars() {
        last = gate.press_digit(digit).await;
    }
    last
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Gate decisions
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_no_lock_configured_never_gates() {
    let h = Harness::new(AutoLockTimeout::from_secs(300)).await;
    let user = h.signed_in_user();

    assert_eq!(h.shell.decide().await, GateDecision::Render);
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user)).await,
        GateDecision::Render
    );

    // No method configured: the idle clock must never start, even with a
    // nonzero timeout
    assert!(!h.idle.is_running());
    assert!(!h.session.engaged_this_session());
}

#[tokio::test(start_paused = true)]
async fn test_fresh_launch_with_pin_shows_gate() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    // Pre-login shell consults the device cache
    assert_eq!(
        h.shell.decide().await,
        GateDecision::ShowGate(LockMethod::Pin)
    );

    // Post-login route engages the machine on first open
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user)).await,
        GateDecision::ShowGate(LockMethod::Pin)
    );
    assert!(h.session.is_locked());
}

#[tokio::test(start_paused = true)]
async fn test_auth_resolving_and_signed_out() {
    let h = Harness::new(AutoLockTimeout::from_secs(300)).await;

    assert_eq!(
        h.guard.decide(AuthSnapshot::Resolving).await,
        GateDecision::Loading
    );
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedOut).await,
        GateDecision::RedirectToSignIn
    );
    assert!(!h.idle.is_running());
}

// ============================================================================
// Unlock flows
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_end_to_end_pin_unlock() {
    let h = Harness::new(AutoLockTimeout::from_secs(300)).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await,
        GateDecision::ShowGate(LockMethod::Pin)
    );

    let gate = h.pin_gate();
    assert!(matches!(
        type_pin(&gate, "482913").await,
        GateEvent::Unlocked
    ));

    // Gate dismissed, content reachable, idle clock armed
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await,
        GateDecision::Render
    );
    assert!(h.idle.is_running());
    assert!(h.flags.is_unlocked().await.unwrap());

    // Background clears the session flag; foreground re-gates
    h.shell.watch_lifecycle();
    h.lifecycle.emit(LifecycleEvent::Background);
    settle().await;
    assert!(!h.flags.is_unlocked().await.unwrap());

    assert_eq!(
        h.shell.decide().await,
        GateDecision::ShowGate(LockMethod::Pin)
    );
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await,
        GateDecision::ShowGate(LockMethod::Pin)
    );

    assert!(matches!(
        type_pin(&gate, "482913").await,
        GateEvent::Unlocked
    ));
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user)).await,
        GateDecision::Render
    );

    h.shell.stop();
    h.idle.stop();
}

#[tokio::test(start_paused = true)]
async fn test_pin_mismatch_clears_entry_and_stays_locked() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "123456").await;

    h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await;
    let gate = h.pin_gate();

    match type_pin(&gate, "000000").await {
        GateEvent::Notice(notice) => {
            assert_eq!(notice.kind(), crate::ErrorKind::Unauthorized);
        }
        other => panic!("expected notice, got {other:?}"),
    }

    // Entry cleared, state still locked, flag unset
    assert_eq!(gate.digits_entered(), 0);
    assert!(h.session.is_locked());
    assert!(!h.flags.is_unlocked().await.unwrap());

    assert!(matches!(
        type_pin(&gate, "123456").await,
        GateEvent::Unlocked
    ));
    assert!(!h.session.is_locked());
}

#[tokio::test(start_paused = true)]
async fn test_prelogin_pin_unlock_uses_device_record() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    // Session ends; the device cache must still serve the challenge
    h.auth.sign_out();

    assert_eq!(
        h.shell.decide().await,
        GateDecision::ShowGate(LockMethod::Pin)
    );

    assert!(h.unlock.unlock_with_pin(Harness::raw_pin("482913")).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_password_unlock() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable(
        &user,
        EnableLockInput {
            method: LockMethod::Password,
            pin: None,
        },
    )
    .await;

    h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await;

    assert!(matches!(
        h.unlock.unlock_with_password("wrong-password").await,
        Err(LockError::InvalidCredential)
    ));
    assert!(h.session.is_locked());

    assert!(h.unlock.unlock_with_password("CorrectHorse9!").await.is_ok());
    assert!(!h.session.is_locked());
}

#[tokio::test(start_paused = true)]
async fn test_biometric_unlock_and_unavailability() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable(
        &user,
        EnableLockInput {
            method: LockMethod::Biometric,
            pin: None,
        },
    )
    .await;

    h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await;

    // Rejection is a credential failure, state stays locked
    h.biometric.set_accept(false);
    assert!(matches!(
        h.unlock.unlock_with_biometric().await,
        Err(LockError::InvalidCredential)
    ));
    assert!(h.session.is_locked());

    h.biometric.set_accept(true);
    assert!(h.unlock.unlock_with_biometric().await.is_ok());
    assert!(!h.session.is_locked());
}

#[tokio::test(start_paused = true)]
async fn test_biometric_unavailable_is_distinct() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable(
        &user,
        EnableLockInput {
            method: LockMethod::Biometric,
            pin: None,
        },
    )
    .await;

    let harness_without_sensor = {
        let biometric = Arc::new(ScriptedBiometrics::new(false));
        Arc::new(UnlockUseCase::new(
            h.profile_repo.clone(),
            h.device_repo.clone(),
            h.flags.clone(),
            h.auth.clone(),
            biometric,
            h.session.clone(),
            h.idle.clone(),
            &LockConfig::default(),
        ))
    };

    assert!(matches!(
        harness_without_sensor.unlock_with_biometric().await,
        Err(LockError::BiometricUnavailable)
    ));
}

// ============================================================================
// Disable / settings
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_disable_lock_takes_effect_immediately() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await;
    let gate = h.pin_gate();
    assert!(matches!(
        type_pin(&gate, "482913").await,
        GateEvent::Unlocked
    ));

    DisableLockUseCase::new(h.profile_repo.clone(), h.device_repo.clone())
        .execute(&user)
        .await
        .unwrap();

    // Fresh foreground with no other state change: no gate
    h.flags.clear().await.unwrap();
    assert_eq!(h.shell.decide().await, GateDecision::Render);
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user)).await,
        GateDecision::Render
    );
}

#[tokio::test(start_paused = true)]
async fn test_remote_failure_leaves_preference_unchanged() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    // Remote down: disabling must fail and leave the local cache intact
    h.profile_repo.set_offline(true);
    let result = DisableLockUseCase::new(h.profile_repo.clone(), h.device_repo.clone())
        .execute(&user)
        .await;
    assert!(matches!(result, Err(LockError::RemoteUnavailable(_))));

    assert_eq!(
        h.shell.decide().await,
        GateDecision::ShowGate(LockMethod::Pin)
    );
}

#[tokio::test(start_paused = true)]
async fn test_remote_unreachable_falls_back_to_device_cache() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    h.profile_repo.set_offline(true);

    // Gate decision and PIN verification both degrade to the cache
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await,
        GateDecision::ShowGate(LockMethod::Pin)
    );
    assert!(h.unlock.unlock_with_pin(Harness::raw_pin("482913")).await.is_ok());
}

// ============================================================================
// Idle re-locking
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_relocks_protected_routes() {
    let h = Harness::new(AutoLockTimeout::from_secs(300)).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await;
    let gate = h.pin_gate();
    assert!(matches!(
        type_pin(&gate, "482913").await,
        GateEvent::Unlocked
    ));
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await,
        GateDecision::Render
    );
    settle().await;

    let mut phases = h.guard.subscribe_phase();
    phases.borrow_and_update();

    tokio::time::advance(Duration::from_secs(301)).await;
    settle().await;

    // Idle fired: the machine locked and the guards observe it
    assert!(h.session.is_locked());
    assert!(phases.has_changed().unwrap());
    assert_eq!(
        *phases.borrow_and_update(),
        GatePhase::Locked(LockMethod::Pin)
    );
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await,
        GateDecision::ShowGate(LockMethod::Pin)
    );

    // Unlock re-arms the clock
    assert!(matches!(
        type_pin(&gate, "482913").await,
        GateEvent::Unlocked
    ));
    assert_eq!(
        h.guard.decide(AuthSnapshot::SignedIn(user)).await,
        GateDecision::Render
    );
    assert!(!h.idle.is_dormant());

    h.idle.stop();
}

#[tokio::test(start_paused = true)]
async fn test_activity_defers_idle_lock() {
    let h = Harness::new(AutoLockTimeout::from_secs(300)).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await;
    assert!(h
        .unlock
        .unlock_with_pin(Harness::raw_pin("482913"))
        .await
        .is_ok());
    h.guard.decide(AuthSnapshot::SignedIn(user)).await;
    settle().await;

    tokio::time::advance(Duration::from_secs(200)).await;
    settle().await;
    h.guard.record_activity();
    settle().await;

    tokio::time::advance(Duration::from_secs(200)).await;
    settle().await;
    assert!(!h.session.is_locked());

    tokio::time::advance(Duration::from_secs(101)).await;
    settle().await;
    assert!(h.session.is_locked());

    h.idle.stop();
}

#[tokio::test(start_paused = true)]
async fn test_auto_lock_update_propagates_to_running_monitor() {
    let h = Harness::new(AutoLockTimeout::from_secs(300)).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    h.guard.decide(AuthSnapshot::SignedIn(user.clone())).await;
    assert!(h
        .unlock
        .unlock_with_pin(Harness::raw_pin("482913"))
        .await
        .is_ok());
    h.guard.decide(AuthSnapshot::SignedIn(user)).await;
    settle().await;

    // 300 -> 10 over the broadcast; the running clock re-arms
    UpdateAutoLockUseCase::new(h.device_repo.clone(), h.settings.clone())
        .execute(AutoLockTimeout::from_secs(10))
        .await
        .unwrap();
    settle().await;

    tokio::time::advance(Duration::from_secs(11)).await;
    settle().await;
    assert!(h.session.is_locked());

    // And the new value was persisted for the next launch
    assert_eq!(
        h.device_repo.find_auto_lock().await.unwrap(),
        Some(AutoLockTimeout::from_secs(10))
    );

    h.idle.stop();
}

// ============================================================================
// Throttling and mutual exclusion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_lockout_after_consecutive_failures() {
    let config = LockConfig {
        throttle: ThrottlePolicy::new(3, 300),
        ..Default::default()
    };
    let h = Harness::with_config(AutoLockTimeout::DISABLED, config).await;
    let user = h.signed_in_user();
    h.enable_pin(&user, "482913").await;

    for _ in 0..3 {
        assert!(matches!(
            h.unlock.unlock_with_pin(Harness::raw_pin("000000")).await,
            Err(LockError::InvalidCredential)
        ));
    }

    // Even the correct PIN is refused while the cooldown runs
    assert!(matches!(
        h.unlock.unlock_with_pin(Harness::raw_pin("482913")).await,
        Err(LockError::LockedOut { .. })
    ));

    tokio::time::advance(Duration::from_secs(301)).await;

    assert!(h.unlock.unlock_with_pin(Harness::raw_pin("482913")).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_verifications_are_mutually_exclusive() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    let user = h.signed_in_user();
    h.enable(
        &user,
        EnableLockInput {
            method: LockMethod::Biometric,
            pin: None,
        },
    )
    .await;

    h.guard.decide(AuthSnapshot::SignedIn(user)).await;

    // Slow platform prompt holds the in-flight guard
    h.biometric.set_delay(Duration::from_secs(5));
    let unlock = h.unlock.clone();
    let biometric_attempt = tokio::spawn(async move { unlock.unlock_with_biometric().await });
    settle().await;

    // A racing PIN submission loses instead of double-verifying
    assert!(matches!(
        h.unlock.unlock_with_pin(Harness::raw_pin("482913")).await,
        Err(LockError::AttemptInProgress)
    ));

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(biometric_attempt.await.unwrap().is_ok());
    assert!(!h.session.is_locked());
}

#[tokio::test(start_paused = true)]
async fn test_gate_refuses_method_none() {
    let h = Harness::new(AutoLockTimeout::DISABLED).await;
    assert!(matches!(
        LockGate::new(LockMethod::None, h.unlock.clone()),
        Err(LockError::Internal(_))
    ));
}
