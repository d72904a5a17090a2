//! In-memory catalog for testing without a database

use crate::catalog::{Catalog, CatalogError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use streamvault_core::models::{CatalogRecord, NewCatalogRecord};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    records: Arc<Mutex<HashMap<Uuid, CatalogRecord>>>,
    fail_inserts: Arc<AtomicBool>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with a database error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sorted_newest_first(mut videos: Vec<CatalogRecord>) -> Vec<CatalogRecord> {
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        videos
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn insert(&self, record: NewCatalogRecord) -> Result<CatalogRecord, CatalogError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(CatalogError::Database(sqlx::Error::PoolClosed));
        }

        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.id) {
            return Err(CatalogError::DuplicateKey(record.id));
        }

        let stored = record.into_record(Utc::now());
        records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: Uuid) -> Result<Option<CatalogRecord>, CatalogError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn list_latest(&self, limit: i64) -> Result<Vec<CatalogRecord>, CatalogError> {
        let videos: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
        let mut videos = Self::sorted_newest_first(videos);
        videos.truncate(limit.max(0) as usize);
        Ok(videos)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<CatalogRecord>, CatalogError> {
        let videos: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(videos))
    }
}
