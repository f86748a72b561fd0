use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::traits::{StorageBackend, validate_key};

/// Filesystem-backed object store.
///
/// Objects live flat under `{base_path}/{key}`. Writes go to `{base_path}/.tmp` first and
/// are hard-linked into place, so a reader never observes a partially written object and
/// an existing key is never replaced.
/// The base directory is created on the first write, not at construction.
pub struct FilesystemStorage {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemStorage {
    pub fn new(base_path: PathBuf, max_size: u64) -> Self {
        Self {
            base_path,
            max_size,
        }
    }

    /// Compute the filesystem path for a key.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    fn temp_dir(&self) -> PathBuf {
        self.base_path.join(".tmp")
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.temp_dir().join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl StorageBackend for FilesystemStorage {
    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;

        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        fs::create_dir_all(self.temp_dir()).await?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        // Unlike rename, linking fails if the target exists.
        let linked = fs::hard_link(&temp_path, &object_path).await;
        let _ = fs::remove_file(&temp_path).await;
        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StorageError::AlreadyExists(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let object_path = self.object_path(key)?;
        match fs::read(&object_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let object_path = self.object_path(key)?;
        Ok(fs::try_exists(&object_path).await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let object_path = self.object_path(key)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn kind(&self) -> &'static str {
        "filesystem"
    }
}
