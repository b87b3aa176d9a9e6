//! Device Key-Value Storage
//!
//! One uniform storage interface for small per-device records, with two
//! implementations selected once at startup:
//! - [`FileStore`] for native shells with a writable data directory
//! - [`MemoryStore`] for web execution and session-scoped state
//!
//! Business logic never branches on the execution platform; it only sees
//! the [`KeyValueStore`] trait.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed (file unreadable/unwritable)
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document could not be parsed
    #[error("Stored document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Trait for device key-value storage backends
#[trait_variant::make(KeyValueStore: Send)]
pub trait LocalKeyValueStore {
    /// Read a value; `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ============================================================================
// File-backed store (native)
// ============================================================================

/// File-backed store for native shells
///
/// All entries live in a single JSON document. Writes go through a
/// temporary file followed by a rename, so a crash mid-write leaves the
/// previous document intact.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store at `path`
    ///
    /// A missing file yields an empty store; an unreadable or corrupt
    /// file is an error the caller decides how to surface.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(entries)?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw.as_bytes()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

// ============================================================================
// In-memory store (web / session scope / tests)
// ============================================================================

/// In-memory store
///
/// Used for web execution (where the browser owns real persistence) and
/// for session-scoped state that must die with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}
