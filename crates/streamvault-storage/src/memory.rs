//! In-memory blob store for testing
//!
//! Behaves like a paginated S3 bucket and can be told to fail specific operations,
//! so publish and compensation paths can be exercised without network access.

use crate::traits::{BlobStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Mock blob store backed by a sorted map
#[derive(Clone)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
    base_url: String,
    page_size: usize,
    fail_put_after: Arc<Mutex<Option<usize>>>,
    fail_deletes: Arc<AtomicBool>,
    puts: Arc<AtomicUsize>,
    list_pages: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            base_url: "https://videos.s3.us-east-1.amazonaws.com".to_string(),
            page_size: 1000,
            fail_put_after: Arc::new(Mutex::new(None)),
            fail_deletes: Arc::new(AtomicBool::new(false)),
            puts: Arc::new(AtomicUsize::new(0)),
            list_pages: Arc::new(AtomicUsize::new(0)),
            delete_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Return listings in pages of `page_size` keys.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Let `successful` further puts succeed, then fail every put.
    pub fn fail_put_after(&self, successful: usize) {
        *self.fail_put_after.lock().unwrap() = Some(self.puts.load(Ordering::SeqCst) + successful);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Seed an object directly, bypassing failure injection.
    pub fn insert(&self, key: &str, data: Vec<u8>, content_type: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }

    /// Number of listing pages served so far.
    pub fn list_pages(&self) -> usize {
        self.list_pages.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// One listing page: up to `page_size` keys after `start_after`, plus whether more remain.
    fn list_page(&self, prefix: &str, start_after: Option<&str>) -> (Vec<String>, bool) {
        self.list_pages.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .filter(|k| start_after.map_or(true, |after| k.as_str() > after));
        let page: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let truncated = matching.next().is_some();
        (page, truncated)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.fail_put_after.lock().unwrap() {
            if attempt >= limit {
                return Err(StorageError::UploadFailed(format!(
                    "Injected upload failure for {}",
                    key
                )));
            }
        }

        self.insert(key, data, content_type);
        Ok(self.public_url(key))
    }

    async fn list_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        loop {
            let (page, truncated) = self.list_page(prefix, keys.last().map(String::as_str));
            keys.extend(page);
            if !truncated {
                break;
            }
        }
        Ok(keys)
    }

    async fn delete_objects(&self, keys: Vec<String>) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(
                "Injected delete failure".to_string(),
            ));
        }

        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(&key);
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
