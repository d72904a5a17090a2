use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use streamvault_core::constants::{MANIFEST_FILENAME, THUMBNAIL_FILENAME};
use streamvault_core::ToolError;
use streamvault_processing::{DurationProbe, ThumbnailExtractor, Transcoder};

/// Scripted stand-in for ffmpeg/ffprobe.
///
/// Writes a playlist, `segments` segment files and a thumbnail the way ffmpeg lays
/// them out, or fails with canned tool output.
pub struct FakeMediaToolkit {
    pub duration: f64,
    pub segments: usize,
    pub fail_probe: bool,
    pub fail_transcode: Option<String>,
    pub fail_thumbnail: Option<String>,
    /// Exit cleanly from transcoding without writing a playlist.
    pub omit_manifest: bool,
    /// Never return from transcoding once partial output is written.
    pub hang_transcode: bool,
    pub transcoded_dirs: Mutex<Vec<PathBuf>>,
}

impl Default for FakeMediaToolkit {
    fn default() -> Self {
        Self {
            duration: 83.6,
            segments: 3,
            fail_probe: false,
            fail_transcode: None,
            fail_thumbnail: None,
            omit_manifest: false,
            hang_transcode: false,
            transcoded_dirs: Mutex::new(Vec::new()),
        }
    }
}

impl FakeMediaToolkit {
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        self.transcoded_dirs.lock().unwrap().clone()
    }

    fn failure(output: &str) -> ToolError {
        ToolError::Failed {
            program: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            output: output.to_string(),
        }
    }
}

#[async_trait]
impl Transcoder for FakeMediaToolkit {
    async fn transcode(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, ToolError> {
        assert!(input.is_file(), "transcoder input must be staged");
        self.transcoded_dirs.lock().unwrap().push(output_dir.to_path_buf());

        // A crashing ffmpeg still leaves partial output behind.
        tokio::fs::write(output_dir.join("output0.ts"), b"partial").await?;
        if self.hang_transcode {
            std::future::pending::<()>().await;
        }
        if let Some(output) = &self.fail_transcode {
            return Err(Self::failure(output));
        }

        let mut playlist = String::from("#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:10\n");
        for i in 0..self.segments {
            tokio::fs::write(output_dir.join(format!("output{}.ts", i)), vec![0u8; 188]).await?;
            playlist.push_str(&format!("#EXTINF:10.0,\noutput{}.ts\n", i));
        }
        playlist.push_str("#EXT-X-ENDLIST\n");

        let manifest = output_dir.join(MANIFEST_FILENAME);
        if !self.omit_manifest {
            tokio::fs::write(&manifest, playlist).await?;
        }
        Ok(manifest)
    }
}

#[async_trait]
impl ThumbnailExtractor for FakeMediaToolkit {
    async fn extract_thumbnail(
        &self,
        _input: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, ToolError> {
        if let Some(output) = &self.fail_thumbnail {
            return Err(Self::failure(output));
        }
        let thumbnail = output_dir.join(THUMBNAIL_FILENAME);
        tokio::fs::write(&thumbnail, b"RIFF0000WEBP").await?;
        Ok(thumbnail)
    }
}

#[async_trait]
impl DurationProbe for FakeMediaToolkit {
    async fn probe(&self, _input: &Path) -> Result<f64, ToolError> {
        if self.fail_probe {
            return Err(ToolError::Failed {
                program: "ffprobe".to_string(),
                status: "exit status: 1".to_string(),
                output: "clip.mp4: Invalid data found when processing input".to_string(),
            });
        }
        Ok(self.duration)
    }
}
