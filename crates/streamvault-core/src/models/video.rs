use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Working record threaded through one ingestion run.
///
/// The `id` is generated once by the stager and reused for the local filename,
/// the remote prefix and the catalog key.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedVideo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub original_filename: String,
    /// `<id>_<original_filename>`
    pub unique_filename: String,
    pub local_path: PathBuf,
    pub duration_seconds: f64,
    /// Human-readable duration, e.g. `45s` or `1:24`.
    pub duration: String,
    pub manifest_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Durable catalog entry for a published video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CatalogRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    pub manifest_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCatalogRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    pub manifest_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: String,
}

impl NewCatalogRecord {
    /// Build the insert payload; `None` until the manifest URL has been published.
    pub fn from_staged(video: &StagedVideo, owner_id: Uuid) -> Option<Self> {
        let manifest_url = video.manifest_url.clone()?;
        Some(Self {
            id: video.id,
            title: video.title.clone(),
            description: video.description.clone(),
            owner_id,
            manifest_url,
            thumbnail_url: video.thumbnail_url.clone(),
            duration: video.duration.clone(),
        })
    }

    /// Materialise the record as the catalog stores it: zero views, both timestamps `now`.
    pub fn into_record(self, now: DateTime<Utc>) -> CatalogRecord {
        CatalogRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            owner_id: self.owner_id,
            manifest_url: self.manifest_url,
            thumbnail_url: self.thumbnail_url,
            duration: self.duration,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
