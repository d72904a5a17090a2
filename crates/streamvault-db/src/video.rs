use crate::catalog::{Catalog, CatalogError};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use streamvault_core::models::{CatalogRecord, NewCatalogRecord};
use uuid::Uuid;

/// Repository for the `videos` table
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for VideoRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "videos", db.operation = "insert", db.record_id = %record.id))]
    async fn insert(&self, record: NewCatalogRecord) -> Result<CatalogRecord, CatalogError> {
        let id = record.id;
        let result = sqlx::query_as::<Postgres, CatalogRecord>(
            r#"
            INSERT INTO videos (id, title, description, owner_id, manifest_url, thumbnail_url, duration, views, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, NOW(), NOW())
            RETURNING id, title, description, owner_id, manifest_url, thumbnail_url, duration, views, created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.owner_id)
        .bind(&record.manifest_url)
        .bind(&record.thumbnail_url)
        .bind(&record.duration)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(video) => Ok(video),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::warn!(video_id = %id, "Duplicate video id rejected by catalog");
                Err(CatalogError::DuplicateKey(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<CatalogRecord>, CatalogError> {
        let video = sqlx::query_as::<Postgres, CatalogRecord>(
            "SELECT id, title, description, owner_id, manifest_url, thumbnail_url, duration, views, created_at, updated_at FROM videos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_latest(&self, limit: i64) -> Result<Vec<CatalogRecord>, CatalogError> {
        let videos = sqlx::query_as::<Postgres, CatalogRecord>(
            "SELECT id, title, description, owner_id, manifest_url, thumbnail_url, duration, views, created_at, updated_at FROM videos ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<CatalogRecord>, CatalogError> {
        let videos = sqlx::query_as::<Postgres, CatalogRecord>(
            "SELECT id, title, description, owner_id, manifest_url, thumbnail_url, duration, views, created_at, updated_at FROM videos WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }
}
