//! Envoy snapshot storage
//!
//! The whole store is written as one JSON document on every flush. Writes go
//! to a temporary file that is synced and then renamed over the previous
//! snapshot, so a crash mid-flush leaves the last good snapshot in place.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs as tokio_fs, io::AsyncWriteExt, sync::RwLock};
use tracing::{debug, info, instrument};

use crate::error::{StorageError, StorageResult};
use crate::store::EnvoyStore;
use crate::types::EnvoyInstance;

pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk layout of a flushed store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvoySnapshot {
    pub version: u32,
    pub envoys: Vec<EnvoyInstance>,
}

/// Durable storage for envoy snapshots
#[async_trait]
pub trait EnvoyStorage: Send + Sync + std::fmt::Debug {
    /// Replace the persisted snapshot with `envoys`
    async fn save_all(&self, envoys: &[EnvoyInstance]) -> StorageResult<()>;

    /// Read the persisted snapshot, empty if nothing was saved yet
    async fn load_all(&self) -> StorageResult<Vec<EnvoyInstance>>;
}

/// JSON file storage
#[derive(Debug)]
pub struct JsonEnvoyStorage {
    path: PathBuf,
}

impl JsonEnvoyStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `envoys.json` inside `data_dir`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join("envoys.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EnvoyStorage for JsonEnvoyStorage {
    #[instrument(skip(self, envoys), fields(count = envoys.len()))]
    async fn save_all(&self, envoys: &[EnvoyInstance]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio_fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::DirectoryCreate(parent.to_path_buf(), e))?;
        }

        let snapshot = EnvoySnapshot {
            version: SNAPSHOT_VERSION,
            envoys: envoys.to_vec(),
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(StorageError::Serialization)?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = tokio_fs::File::create(&temp_path)
            .await
            .map_err(|e| StorageError::FileCreate(temp_path.clone(), e))?;

        file.write_all(json.as_bytes())
            .await
            .map_err(|e| StorageError::FileWrite(temp_path.clone(), e))?;

        file.sync_all()
            .await
            .map_err(|e| StorageError::FileSync(temp_path.clone(), e))?;

        // Atomic rename
        tokio_fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StorageError::FileRename(temp_path, self.path.clone(), e))?;

        debug!("Saved {} envoys to {}", envoys.len(), self.path.display());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_all(&self) -> StorageResult<Vec<EnvoyInstance>> {
        let contents = match tokio_fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No envoy snapshot at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::FileRead(self.path.clone(), e)),
        };

        let snapshot: EnvoySnapshot = serde_json::from_str(&contents)
            .map_err(|e| StorageError::Deserialization(self.path.clone(), e))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StorageError::UnsupportedVersion(snapshot.version));
        }

        Ok(snapshot.envoys)
    }
}

/// Storage that keeps the snapshot in memory only
#[derive(Debug, Default)]
pub struct InMemoryEnvoyStorage {
    envoys: RwLock<Vec<EnvoyInstance>>,
}

impl InMemoryEnvoyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_envoys(envoys: Vec<EnvoyInstance>) -> Self {
        Self {
            envoys: RwLock::new(envoys),
        }
    }
}

#[async_trait]
impl EnvoyStorage for InMemoryEnvoyStorage {
    async fn save_all(&self, envoys: &[EnvoyInstance]) -> StorageResult<()> {
        *self.envoys.write().await = envoys.to_vec();
        Ok(())
    }

    async fn load_all(&self) -> StorageResult<Vec<EnvoyInstance>> {
        Ok(self.envoys.read().await.clone())
    }
}

/// Moves envoys between the in-memory store and durable storage.
#[derive(Debug, Clone)]
pub struct PersistenceBridge {
    storage: Arc<dyn EnvoyStorage>,
}

impl PersistenceBridge {
    pub fn new(storage: Arc<dyn EnvoyStorage>) -> Self {
        Self { storage }
    }

    /// Writes every current envoy. Returns how many were written.
    pub async fn flush(&self, store: &EnvoyStore) -> StorageResult<usize> {
        let envoys = store.all();
        self.storage.save_all(&envoys).await?;
        Ok(envoys.len())
    }

    /// Reads the persisted envoys without touching any store.
    pub async fn load(&self) -> StorageResult<Vec<EnvoyInstance>> {
        self.storage.load_all().await
    }

    /// Loads the persisted envoys into `store` and returns them.
    pub async fn restore(&self, store: &EnvoyStore) -> StorageResult<Vec<EnvoyInstance>> {
        let envoys = self.load().await?;
        for envoy in &envoys {
            store.insert(envoy.clone());
        }
        info!("📦 Restored {} envoys from storage", envoys.len());
        Ok(envoys)
    }
}
