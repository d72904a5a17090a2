//! Streamvault Storage Library
//!
//! Remote blob storage for published HLS artifacts. The pipeline only needs three
//! operations from a backend: put one object, list everything under a prefix and
//! delete a batch of keys. Those are captured by the [`BlobStore`] trait.
//!
//! # Key format
//!
//! Artifacts of one upload share a prefix equal to the upload's unique filename:
//! `{prefix}/{artifact_filename}`. Key construction lives in the `keys` module so
//! the publisher and every backend agree on it.

pub mod factory;
pub mod keys;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_blob_store;
pub use keys::object_key;
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryBlobStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{BlobStore, StorageError, StorageResult};
