//! FFmpegService - HLS transcoding, thumbnail capture and duration probing.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::Arc;
use streamvault_core::constants::{MANIFEST_FILENAME, THUMBNAIL_FILENAME};
use streamvault_core::{PipelineConfig, ToolError};
use tokio::process::Command;
use tokio::sync::Semaphore;

use super::probe::parse_duration;
use super::traits::{DurationProbe, ThumbnailExtractor, Transcoder};

/// Validate that a path is safe to hand to a subprocess
pub(crate) fn validate_path(path: &str) -> Result<(), ToolError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ToolError::InvalidPath(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if Path::new(path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(ToolError::InvalidPath(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (true, _) => stderr.trim().to_string(),
        (false, true) => stdout.trim().to_string(),
        (false, false) => format!("{}\n{}", stdout.trim(), stderr.trim()),
    }
}

/// ffmpeg/ffprobe invocations, bounded by a shared permit pool
#[derive(Clone)]
pub struct FFmpegService {
    ffmpeg_path: String,
    ffprobe_path: String,
    segment_duration: u64,
    thumbnail_offset: u64,
    thumbnail_width: u32,
    permits: Arc<Semaphore>,
}

impl FFmpegService {
    pub fn new(config: &PipelineConfig) -> Result<Self, ToolError> {
        validate_path(&config.ffmpeg_path)?;
        validate_path(&config.ffprobe_path)?;

        Ok(Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            segment_duration: config.segment_duration_secs,
            thumbnail_offset: config.thumbnail_offset_secs,
            thumbnail_width: config.thumbnail_width,
            permits: Arc::new(Semaphore::new(config.max_concurrent_transcodes.max(1))),
        })
    }

    /// ffmpeg arguments producing a flat, codec-copied HLS playlist
    fn transcode_args(&self, input: &Path, manifest: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-start_number".to_string(),
            "0".to_string(),
            "-hls_time".to_string(),
            self.segment_duration.to_string(),
            "-hls_list_size".to_string(),
            "0".to_string(),
            "-f".to_string(),
            "hls".to_string(),
            manifest.to_string_lossy().to_string(),
        ]
    }

    fn thumbnail_args(&self, input: &Path, thumbnail: &Path) -> Vec<String> {
        vec![
            "-ss".to_string(),
            self.thumbnail_offset.to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            format!("scale={}:-1", self.thumbnail_width),
            "-y".to_string(),
            thumbnail.to_string_lossy().to_string(),
        ]
    }

    fn probe_args(input: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            input.to_string_lossy().to_string(),
        ]
    }

    /// Run a tool to completion and return its output
    ///
    /// The child is killed if the returned future is dropped. A non-zero exit is
    /// reported with stdout and stderr combined.
    async fn run(&self, program: &str, args: &[String]) -> Result<Output, ToolError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ToolError::InvalidOutput {
                program: program.to_string(),
                message: "Tool permit pool closed".to_string(),
            })?;

        let start = std::time::Instant::now();
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            let combined = combined_output(&output);
            tracing::error!(
                process.executable.name = %program,
                status = %output.status,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                output = %combined,
                "Media tool failed"
            );
            return Err(ToolError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                output: combined,
            });
        }

        tracing::debug!(
            process.executable.name = %program,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media tool finished"
        );

        Ok(output)
    }

    async fn require_file(program: &str, path: &Path, what: &str) -> Result<(), ToolError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
            Ok(_) | Err(_) => Err(ToolError::InvalidOutput {
                program: program.to_string(),
                message: format!("{} was not produced at {}", what, path.display()),
            }),
        }
    }
}

#[async_trait]
impl Transcoder for FFmpegService {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "hls"
    ))]
    async fn transcode(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, ToolError> {
        validate_path(&input.to_string_lossy())?;
        let manifest = output_dir.join(MANIFEST_FILENAME);

        self.run(&self.ffmpeg_path, &self.transcode_args(input, &manifest))
            .await?;
        Self::require_file(&self.ffmpeg_path, &manifest, "HLS manifest").await?;

        tracing::info!(manifest = %manifest.display(), "HLS transcoding finished");
        Ok(manifest)
    }
}

#[async_trait]
impl ThumbnailExtractor for FFmpegService {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "thumbnail"
    ))]
    async fn extract_thumbnail(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, ToolError> {
        validate_path(&input.to_string_lossy())?;
        let thumbnail = output_dir.join(THUMBNAIL_FILENAME);

        self.run(&self.ffmpeg_path, &self.thumbnail_args(input, &thumbnail))
            .await?;
        // ffmpeg exits cleanly without writing a frame when the seek passes the end.
        Self::require_file(&self.ffmpeg_path, &thumbnail, "Thumbnail").await?;

        Ok(thumbnail)
    }
}

#[async_trait]
impl DurationProbe for FFmpegService {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, input: &Path) -> Result<f64, ToolError> {
        validate_path(&input.to_string_lossy())?;
        let output = self.run(&self.ffprobe_path, &Self::probe_args(input)).await?;
        parse_duration(&self.ffprobe_path, &output.stdout)
    }
}
