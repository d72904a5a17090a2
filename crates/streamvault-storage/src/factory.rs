use crate::{BlobStore, StorageError, StorageResult};
use std::sync::Arc;
use streamvault_core::StorageConfig;

/// Create the remote blob store described by `config`
#[cfg(feature = "storage-s3")]
pub fn create_blob_store(config: &StorageConfig) -> StorageResult<Arc<dyn BlobStore>> {
    if config.bucket.trim().is_empty() {
        return Err(StorageError::ConfigError(
            "S3_BUCKET not configured".to_string(),
        ));
    }

    let storage = crate::S3Storage::new(
        config.bucket.clone(),
        config.region.clone(),
        config.endpoint.clone(),
    )?
    .with_public_base_url(config.public_base_url.clone());

    tracing::info!(
        bucket = %config.bucket,
        region = ?config.region,
        endpoint = ?config.endpoint,
        "Blob store initialized"
    );

    Ok(Arc::new(storage))
}

#[cfg(not(feature = "storage-s3"))]
pub fn create_blob_store(_config: &StorageConfig) -> StorageResult<Arc<dyn BlobStore>> {
    Err(StorageError::ConfigError(
        "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
    ))
}
