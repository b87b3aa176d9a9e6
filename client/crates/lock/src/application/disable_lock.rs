//! Disable Lock Use Case
//!
//! Resets the lock method to none. Remote first: when the profile update
//! fails the local cache is left untouched and the gate keeps standing.

use std::sync::Arc;

use crate::domain::repository::{AuthUser, LockPreferenceRepository, ProfileRepository};
use crate::error::LockResult;

/// Disable lock use case
pub struct DisableLockUseCase<P, L>
where
    P: ProfileRepository,
    L: LockPreferenceRepository,
{
    profile_repo: Arc<P>,
    device_repo: Arc<L>,
}

impl<P, L> DisableLockUseCase<P, L>
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

    pub async fn execute(&self, user: &AuthUser) -> LockResult<()> {
        self.profile_repo.clear_lock(&user.user_id).await?;
        self.device_repo.clear().await?;

        tracing::info!(user_id = %user.user_id, "App lock disabled");

        Ok(())
    }
}
