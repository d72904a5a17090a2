//! Publishing of HLS artifact directories to blob storage.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use streamvault_core::constants::{content_type_for, MANIFEST_EXTENSION, THUMBNAIL_EXTENSION};
use streamvault_core::{PipelineError, PipelineResult};
use streamvault_storage::keys::listing_prefix;
use streamvault_storage::{object_key, BlobStore};

/// Result of a successful upload: everything needed to record or undo it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifacts {
    pub prefix: String,
    pub manifest_url: String,
    pub thumbnail_url: Option<String>,
    pub object_count: usize,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload every regular file in `dir` under `<dir name>/<filename>`.
    async fn upload_directory(&self, dir: &Path) -> PipelineResult<PublishedArtifacts>;

    /// Remove every object under `prefix`. Succeeds when nothing is there.
    async fn delete_prefix(&self, prefix: &str) -> PipelineResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactRole {
    Manifest,
    Thumbnail,
    Other,
}

fn artifact_role(filename: &str) -> ArtifactRole {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(MANIFEST_EXTENSION) => ArtifactRole::Manifest,
        Some(THUMBNAIL_EXTENSION) => ArtifactRole::Thumbnail,
        _ => ArtifactRole::Other,
    }
}

/// Publisher backed by a [`BlobStore`]
#[derive(Clone)]
pub struct HlsPublisher {
    store: Arc<dyn BlobStore>,
}

impl HlsPublisher {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Regular files of `dir` with their roles, sorted by name.
    async fn scan(dir: &Path) -> PipelineResult<Vec<(String, PathBuf, ArtifactRole)>> {
        let read_err =
            |e: std::io::Error| PipelineError::Publish(format!("Failed to read {}: {}", dir.display(), e));

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let file_type = entry.file_type().await.map_err(read_err)?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                return Err(PipelineError::Publish(format!(
                    "Non UTF-8 artifact filename in {}",
                    dir.display()
                )));
            };
            let role = artifact_role(&name);
            files.push((name, entry.path(), role));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        for (role, label) in [
            (ArtifactRole::Manifest, "manifest"),
            (ArtifactRole::Thumbnail, "thumbnail"),
        ] {
            if files.iter().filter(|f| f.2 == role).count() > 1 {
                return Err(PipelineError::Publish(format!(
                    "More than one {} found in {}",
                    label,
                    dir.display()
                )));
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl Publisher for HlsPublisher {
    #[tracing::instrument(skip(self, dir), fields(dir = %dir.display()))]
    async fn upload_directory(&self, dir: &Path) -> PipelineResult<PublishedArtifacts> {
        let prefix = dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                PipelineError::Publish(format!("Invalid output directory: {}", dir.display()))
            })?;

        let files = Self::scan(dir).await?;
        if !files.iter().any(|f| f.2 == ArtifactRole::Manifest) {
            return Err(PipelineError::Publish(format!(
                "no manifest found in {}",
                dir.display()
            )));
        }

        let start = std::time::Instant::now();
        let mut manifest_url = None;
        let mut thumbnail_url = None;
        let mut total_bytes = 0u64;

        for (name, path, role) in &files {
            let key = object_key(&prefix, name).map_err(|e| PipelineError::Publish(e.to_string()))?;
            let data = tokio::fs::read(path).await.map_err(|e| {
                PipelineError::Publish(format!("Failed to read {}: {}", path.display(), e))
            })?;
            total_bytes += data.len() as u64;

            let url = self
                .store
                .put_object(&key, data, content_type_for(name))
                .await
                .map_err(|e| PipelineError::Publish(format!("Failed to upload {}: {}", key, e)))?;

            match role {
                ArtifactRole::Manifest => manifest_url = Some(url),
                ArtifactRole::Thumbnail => thumbnail_url = Some(url),
                ArtifactRole::Other => {}
            }
        }

        let manifest_url = manifest_url
            .ok_or_else(|| PipelineError::Publish(format!("no manifest found in {}", dir.display())))?;

        tracing::info!(
            prefix = %prefix,
            object_count = files.len(),
            size_bytes = total_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Artifacts published"
        );

        Ok(PublishedArtifacts {
            prefix,
            manifest_url,
            thumbnail_url,
            object_count: files.len(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_prefix(&self, prefix: &str) -> PipelineResult<()> {
        let compensation_err = |message: String| PipelineError::Compensation {
            prefix: prefix.to_string(),
            message,
        };

        let listing = listing_prefix(prefix).map_err(|e| compensation_err(e.to_string()))?;
        let keys = self
            .store
            .list_prefix(&listing)
            .await
            .map_err(|e| compensation_err(e.to_string()))?;

        if keys.is_empty() {
            tracing::debug!(prefix = %prefix, "Nothing to delete under prefix");
            return Ok(());
        }

        let count = keys.len();
        self.store
            .delete_objects(keys)
            .await
            .map_err(|e| compensation_err(e.to_string()))?;

        tracing::info!(prefix = %prefix, object_count = count, "Deleted published artifacts");
        Ok(())
    }
}
