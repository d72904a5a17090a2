use crate::traits::{BlobStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, Error as ObjectStoreError, ObjectStore, PutOptions, PutPayload,
};
use std::sync::Arc;

const FALLBACK_REGION: &str = "us-east-1";

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    public_base_url: Option<String>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region; may be omitted when `endpoint_url` points at an S3-compatible provider
    /// * `endpoint_url` - Optional custom endpoint URL (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials are resolved from the standard AWS environment variables.
    pub fn new(
        bucket: String,
        region: Option<String>,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let region = region.unwrap_or_else(|| FALLBACK_REGION.to_string());

        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::from_store(Arc::new(store), bucket, region, endpoint_url))
    }

    /// Wrap an already configured object store.
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            public_base_url: None,
        }
    }

    /// Serve public URLs from `base_url` (e.g. a CDN) instead of the bucket endpoint.
    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url;
        self
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref base) = self.public_base_url {
            format!("{}/{}", base.trim_end_matches('/'), key)
        } else if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl BlobStore for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key);
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), opts)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.generate_url(key))
    }

    async fn list_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let start = std::time::Instant::now();
        let location = Path::from(prefix);

        // The listing stream follows continuation tokens until the last page.
        let keys: Vec<String> = self
            .store
            .list(Some(&location))
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    prefix = %prefix,
                    "S3 list failed"
                );
                StorageError::ListFailed(e.to_string())
            })?;

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            object_count = keys.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(keys)
    }

    async fn delete_objects(&self, keys: Vec<String>) -> StorageResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let start = std::time::Instant::now();
        let count = keys.len();
        let locations = futures::stream::iter(
            keys.into_iter()
                .map(|k| Ok::<Path, ObjectStoreError>(Path::from(k))),
        )
        .boxed();

        let mut results = self.store.delete_stream(locations);
        while let Some(result) = results.next().await {
            match result {
                Ok(_) | Err(ObjectStoreError::NotFound { .. }) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        object_count = count,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 batch delete failed"
                    );
                    return Err(StorageError::DeleteFailed(e.to_string()));
                }
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            object_count = count,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 batch delete successful"
        );

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::ObjectStoreExt;

    fn storage() -> (Arc<InMemory>, S3Storage) {
        let inner = Arc::new(InMemory::new());
        let storage = S3Storage::from_store(
            inner.clone(),
            "videos".to_string(),
            "eu-west-1".to_string(),
            None,
        );
        (inner, storage)
    }

    #[test]
    fn test_generate_url_variants() {
        let (_, aws) = storage();
        assert_eq!(
            aws.public_url("k/output.m3u8"),
            "https://videos.s3.eu-west-1.amazonaws.com/k/output.m3u8"
        );

        let minio = S3Storage::from_store(
            Arc::new(InMemory::new()),
            "videos".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        );
        assert_eq!(
            minio.public_url("k/output.m3u8"),
            "http://localhost:9000/videos/k/output.m3u8"
        );

        let cdn = minio.with_public_base_url(Some("https://cdn.example.com".to_string()));
        assert_eq!(
            cdn.public_url("k/output.m3u8"),
            "https://cdn.example.com/k/output.m3u8"
        );
    }

    #[tokio::test]
    async fn test_put_list_delete() {
        let (inner, storage) = storage();

        let url = storage
            .put_object(
                "abc_clip.mp4/output.m3u8",
                b"#EXTM3U".to_vec(),
                "application/vnd.apple.mpegurl",
            )
            .await
            .unwrap();
        assert!(url.ends_with("/abc_clip.mp4/output.m3u8"));
        storage
            .put_object("abc_clip.mp4/output0.ts", vec![0u8; 16], "video/mp2t")
            .await
            .unwrap();
        storage
            .put_object("abc_clip.mp4.other/output0.ts", vec![0u8; 16], "video/mp2t")
            .await
            .unwrap();

        let stored = inner
            .get(&Path::from("abc_clip.mp4/output.m3u8"))
            .await
            .unwrap();
        assert_eq!(
            stored
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| AsRef::<str>::as_ref(v)),
            Some("application/vnd.apple.mpegurl")
        );

        let mut keys = storage.list_prefix("abc_clip.mp4/").await.unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec!["abc_clip.mp4/output.m3u8", "abc_clip.mp4/output0.ts"]
        );

        storage.delete_objects(keys).await.unwrap();
        assert!(storage.list_prefix("abc_clip.mp4/").await.unwrap().is_empty());
        assert_eq!(
            storage.list_prefix("abc_clip.mp4.other/").await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete_missing_keys_is_ok() {
        let (_, storage) = storage();
        storage
            .delete_objects(vec!["missing/output.m3u8".to_string()])
            .await
            .unwrap();
        storage.delete_objects(Vec::new()).await.unwrap();
    }
}
