//! Capabilities of the external media tool

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use streamvault_core::ToolError;

/// Rewrites a local video into a flat HLS playlist plus segments
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Transcode `input` into `output_dir` and return the manifest path.
    ///
    /// `output_dir` must already exist.
    async fn transcode(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, ToolError>;
}

/// Captures a single still frame
#[async_trait]
pub trait ThumbnailExtractor: Send + Sync {
    /// Write the thumbnail into `output_dir` and return its path.
    async fn extract_thumbnail(&self, input: &Path, output_dir: &Path)
        -> Result<PathBuf, ToolError>;
}

/// Measures playback length
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration of `input` in seconds.
    async fn probe(&self, input: &Path) -> Result<f64, ToolError>;
}
