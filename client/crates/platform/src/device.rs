//! Device identity
//!
//! Derives a stable per-installation fingerprint from an install secret
//! generated on first run and persisted in the device store. Local lock
//! records are namespaced under this fingerprint so that clearing app
//! data (which discards the secret) also orphans any stale records.

use crate::crypto::{from_base64, random_bytes, sha256, to_base64};
use crate::keyvalue::{KeyValueStore, StoreError};

/// Storage key holding the install secret
const INSTALL_SECRET_KEY: &str = "device.install_secret";

/// Execution platform, detected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimePlatform {
    /// Native shell (iOS/Android) with a writable data directory
    Native,
    /// Browser execution
    Web,
}

impl RuntimePlatform {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            RuntimePlatform::Native => "native",
            RuntimePlatform::Web => "web",
        }
    }
}

/// Device identity derived from the install secret
///
/// The fingerprint is `SHA-256(platform_code ":" install_secret)`; the
/// secret itself never leaves the device store.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    platform: RuntimePlatform,
    fingerprint: [u8; 32],
}

impl DeviceIdentity {
    /// Load the identity, generating and persisting the install secret on
    /// first run
    pub async fn load_or_create<K>(store: &K, platform: RuntimePlatform) -> Result<Self, StoreError>
    where
        K: KeyValueStore + Sync,
    {
        let secret = match store.get(INSTALL_SECRET_KEY).await? {
            Some(encoded) if from_base64(&encoded).is_ok() => encoded,
            _ => {
                let encoded = to_base64(&random_bytes(16));
                store.set(INSTALL_SECRET_KEY, &encoded).await?;
                tracing::info!(platform = platform.code(), "Generated install secret");
                encoded
            }
        };

        let fingerprint = sha256(format!("{}:{}", platform.code(), secret).as_bytes());

        Ok(Self {
            platform,
            fingerprint,
        })
    }

    #[inline]
    pub fn platform(&self) -> RuntimePlatform {
        self.platform
    }

    /// Full fingerprint bytes
    #[inline]
    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    /// Key prefix for namespacing local records (first 8 fingerprint bytes)
    pub fn storage_prefix(&self) -> String {
        format!("{}.", hex_encode(&self.fingerprint[..8]))
    }
}

/// Encode bytes as lowercase hex string
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyvalue::MemoryStore;

    #[tokio::test]
    async fn test_identity_stable_across_loads() {
        let store = MemoryStore::new();

        let first = DeviceIdentity::load_or_create(&store, RuntimePlatform::Native)
            .await
            .unwrap();
        let second = DeviceIdentity::load_or_create(&store, RuntimePlatform::Native)
            .await
            .unwrap();

        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.storage_prefix(), second.storage_prefix());
    }

    #[tokio::test]
    async fn test_identity_differs_per_install() {
        let a = DeviceIdentity::load_or_create(&MemoryStore::new(), RuntimePlatform::Native)
            .await
            .unwrap();
        let b = DeviceIdentity::load_or_create(&MemoryStore::new(), RuntimePlatform::Native)
            .await
            .unwrap();

        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[tokio::test]
    async fn test_corrupt_secret_regenerated() {
        let store = MemoryStore::new();
        store.set("device.install_secret", "***").await.unwrap();

        let identity = DeviceIdentity::load_or_create(&store, RuntimePlatform::Web)
            .await
            .unwrap();

        // A fresh, decodable secret replaced the corrupt one
        let stored = store.get("device.install_secret").await.unwrap().unwrap();
        assert!(from_base64(&stored).is_ok());
        assert_eq!(identity.platform(), RuntimePlatform::Web);
    }

    #[test]
    fn test_storage_prefix_shape() {
        let identity = DeviceIdentity {
            platform: RuntimePlatform::Native,
            fingerprint: [0xab; 32],
        };
        assert_eq!(identity.storage_prefix(), "abababababababab.");
    }
}
