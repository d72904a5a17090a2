//! Blob storage abstraction trait
//!
//! This module defines the BlobStore trait that all remote storage backends must implement.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Remote object storage used by the publisher
///
/// Implementations must be safe to share between concurrently running pipelines.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key` and return the object's public URL.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> StorageResult<String>;

    /// Every key under `prefix`, across all listing pages.
    ///
    /// An empty result is not an error.
    async fn list_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete a batch of keys. Keys that no longer exist are ignored.
    async fn delete_objects(&self, keys: Vec<String>) -> StorageResult<()>;

    /// Public URL an object under `key` is (or would be) reachable at.
    fn public_url(&self, key: &str) -> String;
}
