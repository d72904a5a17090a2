//! Production wiring of the ingestion pipeline

use anyhow::{Context, Result};
use std::sync::Arc;
use streamvault_core::{Config, PipelineConfig};
use streamvault_db::VideoRepository;
use streamvault_storage::create_blob_store;

use crate::pipeline::IngestionPipeline;
use crate::recorder::CatalogRecorder;
use crate::video::{FFmpegService, HlsPublisher};

/// Connect the catalog, blob store and media tools described by `config`.
pub async fn build_pipeline(config: &Config) -> Result<IngestionPipeline> {
    config.validate().context("Invalid configuration")?;
    let pipeline_config = resolve_roots(&config.pipeline).await?;

    let pool = streamvault_db::connect(&config.database).await?;
    streamvault_db::run_migrations(&pool).await?;
    let catalog = Arc::new(VideoRepository::new(pool));

    let store = create_blob_store(&config.storage).context("Failed to initialize blob store")?;

    let media = Arc::new(
        FFmpegService::new(&pipeline_config)
            .context("Failed to initialize FFmpeg service: invalid tool path")?,
    );

    tracing::info!(
        storage_root = %pipeline_config.storage_root.display(),
        output_root = %pipeline_config.output_root.display(),
        max_concurrent_transcodes = config.pipeline.max_concurrent_transcodes,
        keep_local_artifacts = config.pipeline.keep_local_artifacts,
        "Ingestion pipeline ready"
    );

    Ok(IngestionPipeline::new(
        pipeline_config,
        media.clone(),
        media.clone(),
        media,
        Arc::new(HlsPublisher::new(store)),
        Arc::new(CatalogRecorder::new(catalog)),
    ))
}

/// Create both local roots and replace them with their canonical absolute paths.
///
/// Staged inputs are handed to ffmpeg, which only accepts paths free of `..` components.
async fn resolve_roots(config: &PipelineConfig) -> Result<PipelineConfig> {
    let mut resolved = config.clone();
    for dir in [&mut resolved.storage_root, &mut resolved.output_root] {
        tokio::fs::create_dir_all(&*dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        *dir = tokio::fs::canonicalize(&*dir)
            .await
            .with_context(|| format!("Failed to resolve directory {}", dir.display()))?;
    }
    Ok(resolved)
}

/// Load configuration from the environment, install tracing and build the pipeline.
pub async fn init_from_env() -> Result<(Config, IngestionPipeline)> {
    let config = Config::from_env().context("Failed to load configuration")?;
    streamvault_infra::init_telemetry(config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!(environment = %config.environment, "Configuration loaded");

    let pipeline = build_pipeline(&config).await?;
    Ok((config, pipeline))
}
