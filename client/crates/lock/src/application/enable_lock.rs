//! Enable Lock Use Case
//!
//! Turns on a lock method for the signed-in user. Writes go to the
//! remote profile record first; the local device cache is updated only
//! on confirmed success, so a remote failure leaves both sides
//! consistent (fail closed).

use std::sync::Arc;

use crate::domain::entity::lock_preference::LockPreference;
use crate::domain::repository::{AuthUser, LockPreferenceRepository, ProfileRepository};
use crate::domain::value_object::{lock_method::LockMethod, pin_code::PinHash, pin_code::RawPin};
use crate::error::{LockError, LockResult};

/// Enable lock input
pub struct EnableLockInput {
    /// Method to enable; must not be `none`
    pub method: LockMethod,
    /// PIN, required iff `method` is `pin`
    pub pin: Option<RawPin>,
}

/// Enable lock use case
pub struct EnableLockUseCase<P, L>
where
    P: ProfileRepository,
    L: LockPreferenceRepository,
{
    profile_repo: Arc<P>,
    device_repo: Arc<L>,
}

impl<P, L> EnableLockUseCase<P, L>
where
    P: ProfileRepository,
    L: LockPreferenceRepository,
{
    pub fn new(profile_repo: Arc<P>, device_repo: Arc<L>) -> Self {
        Self {
            profile_repo,
            device_repo,
        }
    }

    pub async fn execute(&self, user: &AuthUser, input: EnableLockInput) -> LockResult<()> {
        let preference = match input.method {
            LockMethod::None => {
                return Err(LockError::Validation(
                    "Use disable to turn the lock off".to_string(),
                ));
            }
            LockMethod::Pin => {
                let pin = input.pin.ok_or_else(|| {
                    LockError::Validation("A PIN is required for the PIN method".to_string())
                })?;
                let hash = PinHash::from_raw(&pin)?;
                LockPreference::with_pin(hash)
            }
            LockMethod::Biometric => LockPreference::biometric(),
            LockMethod::Password => LockPreference::password(),
        };

        // Authority first: the profile record is the source of truth
        self.profile_repo
            .update_lock(&user.user_id, preference.method(), preference.pin_hash())
            .await?;

        // Cache locally so the gate works before the next sign-in
        self.device_repo.save(&preference).await?;

        tracing::info!(
            user_id = %user.user_id,
            method = %preference.method(),
            "App lock enabled"
        );

        Ok(())
    }
}
