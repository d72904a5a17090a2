//! Local staging of raw uploads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use streamvault_core::models::UploadBody;
use streamvault_core::{PipelineError, PipelineResult, StagedVideo, UploadRequest, ValidationError};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::video::DurationProbe;

const MAX_FILENAME_LEN: usize = 255;

/// Reduce a client-declared filename to a safe base name.
///
/// Directory components are dropped and anything outside `[A-Za-z0-9._-]` becomes `_`.
/// Dots inside the base name are kept, so `trip..v2.mp4` stays as it is.
pub fn sanitize_filename(filename: &str) -> String {
    let base = match Path::new(filename).file_name().and_then(|n| n.to_str()) {
        Some(base) if base != "." && base != ".." => base,
        _ => return "invalid_filename".to_string(),
    };
    let s: String = base
        .chars()
        .take(MAX_FILENAME_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "file".to_string()
    } else {
        s
    }
}

/// Human-readable duration: `"45s"` under a minute, otherwise `"M:SS"`.
///
/// Rounds to the nearest second before splitting, so 119.6 becomes `"2:00"`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };

    if total < 60 {
        format!("{}s", total)
    } else {
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Persists raw uploads under the storage root and measures their duration
pub struct LocalStager {
    storage_root: PathBuf,
    max_upload_bytes: u64,
    probe: Arc<dyn DurationProbe>,
}

impl LocalStager {
    pub fn new(
        storage_root: impl Into<PathBuf>,
        max_upload_bytes: u64,
        probe: Arc<dyn DurationProbe>,
    ) -> Self {
        Self {
            storage_root: storage_root.into(),
            max_upload_bytes,
            probe,
        }
    }

    /// Write the upload body to `<storage_root>/<id>_<filename>`.
    ///
    /// The body is capped at the upload ceiling regardless of the declared length.
    /// A partially written file is removed before the error is returned.
    #[tracing::instrument(skip(self, request), fields(filename = %request.filename))]
    pub async fn persist(&self, request: UploadRequest) -> PipelineResult<StagedVideo> {
        let UploadRequest {
            title,
            description,
            filename,
            body,
            ..
        } = request;

        let id = Uuid::new_v4();
        let original_filename = sanitize_filename(&filename);
        let unique_filename = format!("{}_{}", id, original_filename);
        let local_path = self.storage_root.join(&unique_filename);

        fs::create_dir_all(&self.storage_root).await.map_err(|e| {
            PipelineError::staging(
                format!(
                    "Failed to create storage directory {}",
                    self.storage_root.display()
                ),
                e,
            )
        })?;

        let start = std::time::Instant::now();
        let written = match self.write_body(&local_path, body).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(e) = fs::remove_file(&local_path).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(error = %e, path = %local_path.display(), "Failed to remove partial upload");
                    }
                }
                return Err(err);
            }
        };

        tracing::info!(
            video_id = %id,
            path = %local_path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(StagedVideo {
            id,
            title,
            description,
            original_filename,
            unique_filename,
            local_path,
            duration_seconds: 0.0,
            duration: String::new(),
            manifest_url: None,
            thumbnail_url: None,
        })
    }

    async fn write_body(
        &self,
        path: &Path,
        body: UploadBody,
    ) -> PipelineResult<u64> {
        let mut file = fs::File::create(path)
            .await
            .map_err(|e| PipelineError::staging("Failed to create local file", e))?;

        // One byte past the ceiling is enough to detect an oversized body.
        let mut limited = body.take(self.max_upload_bytes + 1);
        let written = tokio::io::copy(&mut limited, &mut file)
            .await
            .map_err(|e| PipelineError::staging("Failed to write upload to disk", e))?;

        if written > self.max_upload_bytes {
            return Err(ValidationError::FileTooLarge {
                size: written,
                max: self.max_upload_bytes,
            }
            .into());
        }

        file.flush()
            .await
            .map_err(|e| PipelineError::staging("Failed to flush upload to disk", e))?;
        file.sync_all()
            .await
            .map_err(|e| PipelineError::staging("Failed to sync upload to disk", e))?;

        Ok(written)
    }

    /// Probe the staged file and fill in both duration fields.
    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    pub async fn measure(&self, video: &mut StagedVideo) -> PipelineResult<()> {
        let seconds = self
            .probe
            .probe(&video.local_path)
            .await
            .map_err(|e| PipelineError::staging("Failed to measure video duration", e))?;

        video.duration_seconds = seconds;
        video.duration = format_duration(seconds);

        tracing::debug!(
            duration_seconds = seconds,
            duration = %video.duration,
            "Video duration measured"
        );

        Ok(())
    }
}
