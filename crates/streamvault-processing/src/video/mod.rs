//! Video processing module

pub mod output;
pub mod probe;
pub mod publisher;
pub mod service;
pub mod traits;

pub use output::{output_dir_name, prepare_output_dir};
pub use publisher::{HlsPublisher, PublishedArtifacts, Publisher};
pub use service::FFmpegService;
pub use traits::{DurationProbe, ThumbnailExtractor, Transcoder};
