//! Streamvault video ingestion
//!
//! Takes a raw upload from the request layer to a published HLS artifact set and a
//! catalog record:
//!
//! validate → stage (+ probe duration) → transcode → thumbnail → publish → record
//!
//! [`IngestionPipeline`] sequences the stages, removes local files on every exit
//! path and deletes the published prefix again when the catalog write fails.

pub mod cleanup;
pub mod pipeline;
pub mod recorder;
pub mod setup;
pub mod stager;
pub mod validator;
pub mod video;

pub use cleanup::{CleanupScope, LocalArtifactGuard};
pub use pipeline::{IngestionPipeline, PipelineStage};
pub use recorder::{CatalogRecorder, Recorder};
pub use setup::{build_pipeline, init_from_env};
pub use stager::{format_duration, sanitize_filename, LocalStager};
pub use validator::UploadValidator;
pub use video::{
    prepare_output_dir, DurationProbe, FFmpegService, HlsPublisher, PublishedArtifacts,
    Publisher, ThumbnailExtractor, Transcoder,
};
