mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod object;

use std::sync::Arc;

pub use error::StorageError;
pub use traits::{StorageBackend, validate_key};

use crate::config::{StorageConfig, StorageKind};

/// Build the storage backend selected by `config`.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.backend {
        StorageKind::Filesystem => Ok(Arc::new(filesystem::FilesystemStorage::new(
            config.base_path.clone(),
            config.max_blob_size,
        ))),
        #[cfg(feature = "object-storage")]
        StorageKind::S3 => {
            let s3 = config.s3.as_ref().ok_or_else(|| {
                StorageError::Backend("storage.backend = \"s3\" requires a [storage.s3] section".into())
            })?;
            Ok(Arc::new(object::ObjectStorage::new(s3, config.max_blob_size)?))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageKind::S3 => Err(StorageError::Backend(
            "built without the object-storage feature".into(),
        )),
    }
}
