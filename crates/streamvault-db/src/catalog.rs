use async_trait::async_trait;
use streamvault_core::models::{CatalogRecord, NewCatalogRecord};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A record with this id already exists.
    #[error("Video {0} already exists")]
    DuplicateKey(Uuid),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Database(err)
    }
}

/// Durable catalog of published videos
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Insert a record; the view counter starts at zero and both timestamps
    /// are set to the insertion time.
    async fn insert(&self, record: NewCatalogRecord) -> Result<CatalogRecord, CatalogError>;

    async fn get(&self, id: Uuid) -> Result<Option<CatalogRecord>, CatalogError>;

    /// Newest first.
    async fn list_latest(&self, limit: i64) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<CatalogRecord>, CatalogError>;
}
