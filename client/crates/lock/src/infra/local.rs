//! Device Store Repository Implementations
//!
//! Local halves of the lock persistence: the cached preference and the
//! auto-lock timeout in the device's persistent store, the
//! session-unlocked flag in a session-scoped store. All records are
//! namespaced under the device fingerprint prefix.

use std::sync::Arc;

use platform::device::DeviceIdentity;
use platform::keyvalue::KeyValueStore;
use serde::{Deserialize, Serialize};

use crate::application::config::LockConfig;
use crate::domain::entity::lock_preference::LockPreference;
use crate::domain::repository::{
    LockPreferenceRepository, SessionFlagRepository,
};
use crate::domain::value_object::{
    idle_timeout::AutoLockTimeout, lock_method::LockMethod, pin_code::PinHash,
};
use crate::error::{LockError, LockResult};

/// Stored shape of the lock preference
#[derive(Debug, Serialize, Deserialize)]
struct PreferenceRecord {
    method: String,
    pin_phc: Option<String>,
    updated_at_ms: i64,
}

impl PreferenceRecord {
    fn from_preference(preference: &LockPreference) -> Self {
        Self {
            method: preference.method().code().to_string(),
            pin_phc: preference.pin_hash().map(|h| h.as_phc_string().to_string()),
            updated_at_ms: preference.updated_at.timestamp_millis(),
        }
    }

    /// Rebuild the entity; stale or hand-edited records yield `None`
    fn into_preference(self) -> Option<LockPreference> {
        let method = LockMethod::from_code(&self.method)?;
        let pin_hash = match self.pin_phc {
            Some(phc) => Some(PinHash::from_phc_string(phc).ok()?),
            None => None,
        };
        LockPreference::from_parts(method, pin_hash)
    }
}

/// Device-persistent lock store
#[derive(Clone)]
pub struct DeviceStore<K> {
    store: Arc<K>,
    config: Arc<LockConfig>,
    prefix: String,
}

impl<K> DeviceStore<K>
where
    K: KeyValueStore,
{
    pub fn new(store: Arc<K>, config: Arc<LockConfig>, identity: &DeviceIdentity) -> Self {
        Self {
            store,
            config,
            prefix: identity.storage_prefix(),
        }
    }

    fn preference_key(&self) -> String {
        format!("{}{}", self.prefix, self.config.preference_key)
    }

    fn auto_lock_key(&self) -> String {
        format!("{}{}", self.prefix, self.config.auto_lock_key)
    }
}

impl<K> LockPreferenceRepository for DeviceStore<K>
where
    K: KeyValueStore + Send + Sync,
{
    async fn find(&self) -> LockResult<Option<LockPreference>> {
        let Some(raw) = self.store.get(&self.preference_key()).await? else {
            return Ok(None);
        };

        let record: PreferenceRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt lock preference record; treating as absent");
                return Ok(None);
            }
        };

        match record.into_preference() {
            Some(preference) => Ok(Some(preference)),
            None => {
                tracing::warn!("Stale lock preference record; treating as absent");
                Ok(None)
            }
        }
    }

    async fn save(&self, preference: &LockPreference) -> LockResult<()> {
        let record = PreferenceRecord::from_preference(preference);
        let raw = serde_json::to_string(&record)
            .map_err(|e| LockError::Internal(format!("Preference encoding failed: {e}")))?;

        self.store.set(&self.preference_key(), &raw).await?;
        Ok(())
    }

    async fn clear(&self) -> LockResult<()> {
        self.store.remove(&self.preference_key()).await?;
        Ok(())
    }

    async fn find_auto_lock(&self) -> LockResult<Option<AutoLockTimeout>> {
        let Some(raw) = self.store.get(&self.auto_lock_key()).await? else {
            return Ok(None);
        };

        match raw.parse::<u32>() {
            Ok(secs) => Ok(Some(AutoLockTimeout::from_secs(secs))),
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt auto-lock record; treating as absent");
                Ok(None)
            }
        }
    }

    async fn save_auto_lock(&self, timeout: AutoLockTimeout) -> LockResult<()> {
        self.store
            .set(&self.auto_lock_key(), &timeout.secs().to_string())
            .await?;
        Ok(())
    }
}

/// Session-scoped flag store
///
/// Backed by a session-scoped key-value store: the flag dies with the
/// app session and is cleared explicitly on backgrounding.
#[derive(Clone)]
pub struct SessionFlags<S> {
    store: Arc<S>,
    config: Arc<LockConfig>,
}

impl<S> SessionFlags<S>
where
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>, config: Arc<LockConfig>) -> Self {
        Self { store, config }
    }
}

impl<S> SessionFlagRepository for SessionFlags<S>
where
    S: KeyValueStore + Send + Sync,
{
    async fn is_unlocked(&self) -> LockResult<bool> {
        Ok(self
            .store
            .get(&self.config.session_flag_key)
            .await?
            .as_deref()
            == Some("1"))
    }

    async fn set_unlocked(&self) -> LockResult<()> {
        self.store.set(&self.config.session_flag_key, "1").await?;
        Ok(())
    }

    async fn clear(&self) -> LockResult<()> {
        self.store.remove(&self.config.session_flag_key).await?;
        Ok(())
    }
}
