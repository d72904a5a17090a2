use async_trait::async_trait;
use std::sync::Arc;
use streamvault_core::{CatalogRecord, NewCatalogRecord, PipelineError, PipelineResult, StagedVideo};
use streamvault_db::{Catalog, CatalogError};
use uuid::Uuid;

/// Writes the final catalog record of a run
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Insert the record for `video`, keyed by its pipeline id.
    ///
    /// `video` must already carry its published manifest URL.
    async fn record(&self, video: &StagedVideo, owner_id: Uuid) -> PipelineResult<CatalogRecord>;
}

/// Recorder backed by a [`Catalog`]
#[derive(Clone)]
pub struct CatalogRecorder {
    catalog: Arc<dyn Catalog>,
}

impl CatalogRecorder {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Recorder for CatalogRecorder {
    #[tracing::instrument(skip(self, video, owner_id), fields(video_id = %video.id, owner_id = %owner_id))]
    async fn record(&self, video: &StagedVideo, owner_id: Uuid) -> PipelineResult<CatalogRecord> {
        let record = NewCatalogRecord::from_staged(video, owner_id).ok_or_else(|| {
            PipelineError::Persistence(format!("Video {} has no published manifest URL", video.id))
        })?;

        match self.catalog.insert(record).await {
            Ok(stored) => {
                tracing::info!(video_id = %stored.id, "Catalog record created");
                Ok(stored)
            }
            Err(CatalogError::DuplicateKey(id)) => Err(PipelineError::DuplicateRecord(id)),
            Err(CatalogError::Database(e)) => Err(PipelineError::Persistence(e.to_string())),
        }
    }
}
