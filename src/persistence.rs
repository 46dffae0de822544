//! Keyed JSON blob storage and the background worker that writes to it.
//!
//! Writers hand snapshots to an unbounded channel and return immediately; the
//! worker coalesces whatever is queued down to the latest value before it
//! touches storage.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

pub const FORM_DRAFT_KEY: &str = "rpm_form_draft";
pub const LIBRARY_KEY: &str = "rpm_library";

const DEBOUNCE_MS: u64 = 200;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key`.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// One `<key>.json` file per blob under a data directory.
pub struct FileBlobStorage {
    dir: PathBuf,
}

impl FileBlobStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl BlobStorage for FileBlobStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        // Staged write; readers never see a partial blob.
        let target = self.path(key);
        let staging = self.dir.join(format!("{key}.json.tmp"));
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &target).await?;
        Ok(())
    }
}

/// Process-local storage, used when no data directory should be touched.
#[derive(Default)]
pub struct MemoryBlobStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.blobs.lock().insert(key.to_string(), bytes);
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.insert(key, bytes.to_vec());
        Ok(())
    }
}

/// Read and decode a blob. Missing, unreadable or malformed data is "no data".
pub async fn load_json<T: DeserializeOwned>(storage: &dyn BlobStorage, key: &str) -> Option<T> {
    let bytes = match storage.read(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read saved '{}': {}", key, e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring malformed saved '{}': {}", key, e);
            None
        }
    }
}

/// Spawn a worker persisting every value sent on the returned channel under `key`.
pub fn spawn_persistence_worker<T>(
    key: &'static str,
    storage: Arc<dyn BlobStorage>,
) -> mpsc::UnboundedSender<T>
where
    T: Serialize + Send + Sync + 'static,
{
    let (sender, receiver) = mpsc::unbounded_channel();
    tokio::spawn(start_persistence_worker(key, receiver, storage));
    sender
}

pub async fn start_persistence_worker<T: Serialize>(
    key: &'static str,
    mut receiver: mpsc::UnboundedReceiver<T>,
    storage: Arc<dyn BlobStorage>,
) {
    log::info!("Persistence worker for '{}' started", key);

    while let Some(value) = receiver.recv().await {
        let mut latest = value;
        while let Ok(newer) = receiver.try_recv() {
            latest = newer;
        }

        tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS)).await;

        while let Ok(newer) = receiver.try_recv() {
            log::debug!("Coalescing queued '{}' snapshot", key);
            latest = newer;
        }

        if let Err(e) = persist(key, &latest, storage.as_ref()).await {
            log::error!("Failed to persist '{}': {}", key, e);
        } else {
            log::debug!("Persisted '{}'", key);
        }
    }

    log::info!("Persistence worker for '{}' stopped", key);
}

pub async fn persist<T: Serialize>(
    key: &str,
    value: &T,
    storage: &dyn BlobStorage,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    storage.write(key, &bytes).await
}
