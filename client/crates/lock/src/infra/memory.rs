//! In-Memory Repository Implementations
//!
//! Test doubles that also back the dev host when no remote backend is
//! configured. Both remote collaborators can be switched "offline" to
//! exercise the unreachable-authority paths.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use kernel::id::UserId;
use platform::biometric::{BiometricError, BiometricGateway};
use uuid::Uuid;

use crate::domain::repository::{AuthGateway, AuthUser, LockProfile, ProfileRepository};
use crate::domain::value_object::{lock_method::LockMethod, pin_code::PinHash};
use crate::error::{LockError, LockResult};

fn offline_error() -> LockError {
    LockError::RemoteUnavailable("simulated outage".to_string())
}

// ============================================================================
// Profile record store
// ============================================================================

/// In-memory profile repository
#[derive(Default)]
pub struct InMemoryProfileRepository {
    records: Mutex<HashMap<Uuid, LockProfile>>,
    offline: AtomicBool,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend being unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    async fn find_lock_profile(&self, user_id: &UserId) -> LockResult<Option<LockProfile>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline_error());
        }

        let records = self.records.lock().expect("profile records poisoned");
        Ok(records.get(user_id.as_uuid()).cloned())
    }

    async fn update_lock(
        &self,
        user_id: &UserId,
        method: LockMethod,
        pin_hash: Option<&PinHash>,
    ) -> LockResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline_error());
        }

        let mut records = self.records.lock().expect("profile records poisoned");
        records.insert(
            *user_id.as_uuid(),
            LockProfile {
                method,
                pin_hash: pin_hash.cloned(),
            },
        );
        Ok(())
    }

    async fn clear_lock(&self, user_id: &UserId) -> LockResult<()> {
        self.update_lock(user_id, LockMethod::None, None).await
    }
}

// ============================================================================
// Auth provider
// ============================================================================

/// In-memory auth provider gateway
#[derive(Default)]
pub struct InMemoryAuthGateway {
    account: Mutex<Option<(AuthUser, String)>>,
    offline: AtomicBool,
}

impl InMemoryAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish a signed-in session with the given password on record
    pub fn sign_in_as(&self, user: AuthUser, password: impl Into<String>) {
        let mut account = self.account.lock().expect("auth account poisoned");
        *account = Some((user, password.into()));
    }

    /// Drop the session
    pub fn sign_out(&self) {
        let mut account = self.account.lock().expect("auth account poisoned");
        *account = None;
    }

    /// Simulate the provider being unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl AuthGateway for InMemoryAuthGateway {
    async fn current_user(&self) -> LockResult<Option<AuthUser>> {
        let account = self.account.lock().expect("auth account poisoned");
        Ok(account.as_ref().map(|(user, _)| user.clone()))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> LockResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline_error());
        }

        let account = self.account.lock().expect("auth account poisoned");
        match account.as_ref() {
            Some((user, stored)) if user.email == email && stored == password => Ok(()),
            Some(_) => Err(LockError::InvalidCredential),
            None => Err(LockError::InvalidCredential),
        }
    }
}

// ============================================================================
// Biometrics
// ============================================================================

/// Scripted biometric gateway
pub struct ScriptedBiometrics {
    available: bool,
    accept: AtomicBool,
    delay: Mutex<Option<std::time::Duration>>,
}

impl ScriptedBiometrics {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            accept: AtomicBool::new(true),
            delay: Mutex::new(None),
        }
    }

    /// Whether the next check accepts or rejects the user
    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    /// Make the platform prompt take this long (exposes in-flight races)
    pub fn set_delay(&self, delay: std::time::Duration) {
        let mut slot = self.delay.lock().expect("biometric delay poisoned");
        *slot = Some(delay);
    }
}

impl BiometricGateway for ScriptedBiometrics {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn verify(&self, _reason: &str) -> Result<(), BiometricError> {
        let delay = *self.delay.lock().expect("biometric delay poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if !self.available {
            return Err(BiometricError::Unavailable);
        }
        if self.accept.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BiometricError::Rejected)
        }
    }
}
