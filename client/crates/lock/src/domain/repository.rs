//! Repository and Gateway Traits
//!
//! Interfaces for persistence and external collaborators. Implementation
//! is in the infrastructure layer; the managed backend (auth provider,
//! profile records) and the platform biometric API stay behind these
//! seams.

use kernel::id::UserId;

use crate::domain::entity::lock_preference::LockPreference;
use crate::domain::value_object::{
    idle_timeout::AutoLockTimeout, lock_method::LockMethod, pin_code::PinHash,
};
use crate::error::LockResult;

/// Snapshot of the signed-in account as the auth provider reports it
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    /// Known email, used for the password re-authentication flow
    pub email: String,
}

/// Lock-related fields of the remote profile record
#[derive(Debug, Clone)]
pub struct LockProfile {
    pub method: LockMethod,
    pub pin_hash: Option<PinHash>,
}

/// Local (device) lock preference repository trait
#[trait_variant::make(LockPreferenceRepository: Send)]
pub trait LocalLockPreferenceRepository {
    /// Read the cached preference; `None` when nothing is stored
    async fn find(&self) -> LockResult<Option<LockPreference>>;

    /// Write the preference (including the PIN hash when present)
    async fn save(&self, preference: &LockPreference) -> LockResult<()>;

    /// Remove the cached preference; used when lock is disabled and on
    /// logout
    async fn clear(&self) -> LockResult<()>;

    /// Read the per-device auto-lock timeout
    async fn find_auto_lock(&self) -> LockResult<Option<AutoLockTimeout>>;

    /// Persist the per-device auto-lock timeout
    async fn save_auto_lock(&self, timeout: AutoLockTimeout) -> LockResult<()>;
}

/// Session-unlocked flag repository trait
///
/// Backed by session-scoped storage: the flag dies with the app session
/// (tab close on web) and is cleared explicitly on backgrounding.
#[trait_variant::make(SessionFlagRepository: Send)]
pub trait LocalSessionFlagRepository {
    /// Whether the gate was passed earlier in this session
    async fn is_unlocked(&self) -> LockResult<bool>;

    /// Mark the session unlocked after successful verification
    async fn set_unlocked(&self) -> LockResult<()>;

    /// Drop the flag (backgrounding, idle lock, logout)
    async fn clear(&self) -> LockResult<()>;
}

/// Remote profile record repository trait
#[trait_variant::make(ProfileRepository: Send)]
pub trait LocalProfileRepository {
    /// Fetch the lock fields of the profile record
    async fn find_lock_profile(&self, user_id: &UserId) -> LockResult<Option<LockProfile>>;

    /// Update lock method and PIN hash on the profile record
    async fn update_lock(
        &self,
        user_id: &UserId,
        method: LockMethod,
        pin_hash: Option<&PinHash>,
    ) -> LockResult<()>;

    /// Reset the profile record to no lock
    async fn clear_lock(&self, user_id: &UserId) -> LockResult<()>;
}

/// Authentication provider gateway trait
#[trait_variant::make(AuthGateway: Send)]
pub trait LocalAuthGateway {
    /// Currently signed-in account, if any
    async fn current_user(&self) -> LockResult<Option<AuthUser>>;

    /// Full sign-in attempt; success doubles as password verification
    async fn sign_in_with_password(&self, email: &str, password: &str) -> LockResult<()>;
}
