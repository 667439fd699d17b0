//! Durable string-blob storage used to persist the cache between sessions

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::constants::{APP_DIR_NAME, persistence::FILE_EXTENSION};
use crate::error::AppError;

/// Opaque named-blob store backing a [`CacheStore`](super::CacheStore).
///
/// Implementations report their own failures; the cache store logs and
/// swallows them.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, name: &str, value: &str) -> Result<(), AppError>;
    async fn remove(&self, name: &str) -> Result<(), AppError>;
}

/// In-process storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, AppError> {
        Ok(self.blobs.read().await.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), AppError> {
        self.blobs
            .write()
            .await
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), AppError> {
        self.blobs.write().await.remove(name);
        Ok(())
    }
}

/// One JSON file per blob inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage under the platform cache directory (e.g. ~/.cache on Linux),
    /// falling back to the current directory.
    pub fn default_location() -> Self {
        Self::new(
            dirs::cache_dir()
                .unwrap_or_else(|| Path::new(".").to_path_buf())
                .join(APP_DIR_NAME),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `name`. Bytes outside `[A-Za-z0-9-]`, `_` included, are
    /// written as `_XX` hex so the mapping stays one-to-one and a blob name
    /// can never escape the directory.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let mut file_stem = String::with_capacity(name.len());
        for byte in name.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                file_stem.push(char::from(byte));
            } else {
                file_stem.push_str(&format!("_{byte:02X}"));
            }
        }
        self.dir.join(format!("{file_stem}.{FILE_EXTENSION}"))
    }
}

#[async_trait]
impl StorageAdapter for FileStorage {
    #[instrument(skip(self))]
    async fn get(&self, name: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(name);
        match fs::read_to_string(&path).await {
            Ok(content) => {
                debug!("Read {} bytes from {}", content.len(), path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No persisted blob at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(AppError::storage_error(format!(
                "Failed to read '{}': {e}",
                path.display()
            ))),
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, name: &str, value: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(name);
        // Write to a sibling file and rename so readers never see a torn blob
        let tmp_path = path.with_extension(format!("{FILE_EXTENSION}.tmp"));
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &path).await?;
        debug!("Persisted blob to {}", path.display());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, name: &str) -> Result<(), AppError> {
        let path = self.path_for(name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
