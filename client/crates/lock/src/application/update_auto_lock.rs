//! Update Auto-Lock Use Case
//!
//! Persists the per-device idle timeout and broadcasts it so running
//! monitors pick the new value up without a reload.

use std::sync::Arc;

use crate::application::config::SettingsBus;
use crate::domain::repository::LockPreferenceRepository;
use crate::domain::value_object::idle_timeout::AutoLockTimeout;
use crate::error::LockResult;

/// Update auto-lock use case
pub struct UpdateAutoLockUseCase<L>
where
    L: LockPreferenceRepository,
{
    device_repo: Arc<L>,
    settings: Arc<SettingsBus>,
}

impl<L> UpdateAutoLockUseCase<L>
where
    L: LockPreferenceRepository,
{
    pub fn new(device_repo: Arc<L>, settings: Arc<SettingsBus>) -> Self {
        Self {
            device_repo,
            settings,
        }
    }

    pub async fn execute(&self, timeout: AutoLockTimeout) -> LockResult<()> {
        self.device_repo.save_auto_lock(timeout).await?;
        self.settings.publish(timeout);

        tracing::info!(timeout = %timeout, "Auto-lock timeout updated");

        Ok(())
    }
}
