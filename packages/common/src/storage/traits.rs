use async_trait::async_trait;

use super::error::StorageError;

/// Key-addressed byte storage.
///
/// Keys are opaque flat names produced by [`crate::path::PathAllocator`]. A backend never
/// overwrites an existing object: key uniqueness is a hard constraint at this layer, not
/// only a property of the allocator.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store `data` under `key`, tagging it with `content_type` where the backend supports it.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Retrieve all bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete the object under `key`.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Short backend name for logs.
    fn kind(&self) -> &'static str;
}

/// Validate a storage key before it is used to address an object.
///
/// Keys must be a single non-hidden path component.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key is empty".into()));
    }
    if key.starts_with('.') {
        return Err(StorageError::InvalidKey(format!(
            "key must not start with '.': {key}"
        )));
    }
    if key.contains(['/', '\\', '\0']) || key.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "key must be a single path component: {key}"
        )));
    }
    Ok(())
}
