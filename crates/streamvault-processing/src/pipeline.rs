//! Ingestion pipeline orchestration: validate → stage → transcode → thumbnail → publish → record.

use std::fmt;
use std::sync::Arc;

use streamvault_core::{
    CatalogRecord, ErrorMetadata, LogLevel, PipelineConfig, PipelineError, PipelineResult,
    ToolError, UploadRequest,
};
use uuid::Uuid;

use crate::cleanup::CleanupScope;
use crate::recorder::Recorder;
use crate::stager::LocalStager;
use crate::validator::UploadValidator;
use crate::video::{
    prepare_output_dir, DurationProbe, Publisher, ThumbnailExtractor, Transcoder,
};

/// Position of a run in the ingestion state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Staged,
    Transcoded,
    ThumbnailExtracted,
    Published,
    Recorded,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::Staged => "staged",
            PipelineStage::Transcoded => "transcoded",
            PipelineStage::ThumbnailExtracted => "thumbnail_extracted",
            PipelineStage::Published => "published",
            PipelineStage::Recorded => "recorded",
            PipelineStage::Failed => "failed",
        }
    }

    /// The stage a run in this state attempts next.
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Received => Some(PipelineStage::Validated),
            PipelineStage::Validated => Some(PipelineStage::Staged),
            PipelineStage::Staged => Some(PipelineStage::Transcoded),
            PipelineStage::Transcoded => Some(PipelineStage::ThumbnailExtracted),
            PipelineStage::ThumbnailExtracted => Some(PipelineStage::Published),
            PipelineStage::Published => Some(PipelineStage::Recorded),
            PipelineStage::Recorded | PipelineStage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run state: current stage and the ids known so far.
struct RunState {
    stage: PipelineStage,
    video_id: Option<Uuid>,
}

impl RunState {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Received,
            video_id: None,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert_eq!(self.stage.next(), Some(next));
        tracing::info!(
            video_id = ?self.video_id,
            from = %self.stage,
            to = %next,
            "Pipeline stage completed"
        );
        self.stage = next;
    }
}

/// Runs one upload through every stage
///
/// Runs share no mutable state; each works under its own generated id.
pub struct IngestionPipeline {
    config: PipelineConfig,
    validator: UploadValidator,
    stager: LocalStager,
    transcoder: Arc<dyn Transcoder>,
    thumbnails: Arc<dyn ThumbnailExtractor>,
    publisher: Arc<dyn Publisher>,
    recorder: Arc<dyn Recorder>,
}

impl IngestionPipeline {
    pub fn new(
        config: PipelineConfig,
        transcoder: Arc<dyn Transcoder>,
        thumbnails: Arc<dyn ThumbnailExtractor>,
        probe: Arc<dyn DurationProbe>,
        publisher: Arc<dyn Publisher>,
        recorder: Arc<dyn Recorder>,
    ) -> Self {
        let validator = UploadValidator::from_config(&config);
        let stager = LocalStager::new(config.storage_root.clone(), config.max_upload_bytes, probe);
        Self {
            config,
            validator,
            stager,
            transcoder,
            thumbnails,
            publisher,
            recorder,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest one upload for `owner_id`.
    ///
    /// Local files created by the run are gone when this returns, whatever the
    /// outcome. If the catalog write fails after publishing, the published prefix
    /// is deleted before the catalog error is returned.
    #[tracing::instrument(skip(self, request, owner_id), fields(filename = %request.filename, owner_id = %owner_id))]
    pub async fn run(&self, request: UploadRequest, owner_id: Uuid) -> PipelineResult<CatalogRecord> {
        let start = std::time::Instant::now();
        let mut state = RunState::new();

        let result = self.execute(request, owner_id, &mut state).await;

        match &result {
            Ok(record) => {
                tracing::info!(
                    video_id = %record.id,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video ingested"
                );
            }
            Err(err) => {
                let failed_in = state.stage.next().unwrap_or(state.stage);
                state.stage = PipelineStage::Failed;
                match err.log_level() {
                    LogLevel::Debug => tracing::debug!(
                        video_id = ?state.video_id,
                        stage = %failed_in,
                        state = %state.stage,
                        error_type = err.error_type(),
                        error = %err,
                        "Upload rejected"
                    ),
                    LogLevel::Warn | LogLevel::Error => tracing::error!(
                        video_id = ?state.video_id,
                        stage = %failed_in,
                        state = %state.stage,
                        error_type = err.error_type(),
                        error = %err.detailed_message(),
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Video ingestion failed"
                    ),
                }
            }
        }

        result
    }

    async fn execute(
        &self,
        request: UploadRequest,
        owner_id: Uuid,
        state: &mut RunState,
    ) -> PipelineResult<CatalogRecord> {
        let mut cleanup = CleanupScope::new(self.config.keep_local_artifacts);

        self.validator.validate_request(&request)?;
        state.advance(PipelineStage::Validated);

        let mut video = self.stager.persist(request).await?;
        state.video_id = Some(video.id);
        cleanup.register_file(&video.local_path);
        self.stager.measure(&mut video).await?;
        state.advance(PipelineStage::Staged);

        let output_dir = prepare_output_dir(&self.config.output_root, &video.unique_filename)
            .await
            .map_err(|e| PipelineError::Transcode(ToolError::Io(e)))?;
        cleanup.register_directory(&output_dir);
        self.transcoder
            .transcode(&video.local_path, &output_dir)
            .await
            .map_err(PipelineError::Transcode)?;
        state.advance(PipelineStage::Transcoded);

        if video.duration_seconds < self.config.thumbnail_offset_secs as f64 {
            return Err(PipelineError::Thumbnail(ToolError::InvalidOutput {
                program: "thumbnail".to_string(),
                message: format!(
                    "Video is {:.1}s long, shorter than the {}s thumbnail offset",
                    video.duration_seconds, self.config.thumbnail_offset_secs
                ),
            }));
        }
        self.thumbnails
            .extract_thumbnail(&video.local_path, &output_dir)
            .await
            .map_err(PipelineError::Thumbnail)?;
        state.advance(PipelineStage::ThumbnailExtracted);

        let published = self.publisher.upload_directory(&output_dir).await?;
        video.manifest_url = Some(published.manifest_url.clone());
        video.thumbnail_url = published.thumbnail_url.clone();
        state.advance(PipelineStage::Published);

        match self.recorder.record(&video, owner_id).await {
            Ok(record) => {
                state.advance(PipelineStage::Recorded);
                Ok(record)
            }
            Err(err @ PipelineError::Persistence(_)) => {
                self.compensate(&published.prefix).await;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Best-effort removal of a published prefix; failures are logged, never returned.
    async fn compensate(&self, prefix: &str) {
        tracing::warn!(prefix = %prefix, "Catalog write failed, deleting published artifacts");

        match self.publisher.delete_prefix(prefix).await {
            Ok(()) => {
                tracing::info!(prefix = %prefix, "Compensation completed");
            }
            Err(err) => {
                let err = match err {
                    err @ PipelineError::Compensation { .. } => err,
                    other => PipelineError::Compensation {
                        prefix: prefix.to_string(),
                        message: other.to_string(),
                    },
                };
                tracing::error!(
                    prefix = %prefix,
                    error_type = err.error_type(),
                    error = %err,
                    "Compensation failed, published artifacts remain"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let mut stage = PipelineStage::Received;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            visited.push(next);
            stage = next;
        }
        assert_eq!(
            visited,
            vec![
                PipelineStage::Received,
                PipelineStage::Validated,
                PipelineStage::Staged,
                PipelineStage::Transcoded,
                PipelineStage::ThumbnailExtracted,
                PipelineStage::Published,
                PipelineStage::Recorded,
            ]
        );
        assert!(PipelineStage::Recorded.is_terminal());
        assert!(PipelineStage::Failed.is_terminal());
        assert!(!PipelineStage::Published.is_terminal());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(
            PipelineStage::ThumbnailExtracted.to_string(),
            "thumbnail_extracted"
        );
    }
}
