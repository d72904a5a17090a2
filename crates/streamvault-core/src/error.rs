//! Error types module
//!
//! Every failure of an ingestion run is reported as a [`PipelineError`]. The variants
//! follow the pipeline stages so the caller can tell a client mistake (validation)
//! from an operational failure, and tool failures keep the captured subprocess output.

use uuid::Uuid;

use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TRANSCODE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried automatically)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failure of an external media tool (ffmpeg / ffprobe).
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {output}")]
    Failed {
        program: String,
        status: String,
        output: String,
    },

    #[error("{program} produced unusable output: {message}")]
    InvalidOutput { program: String, message: String },

    #[error("Invalid tool path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Captured stdout+stderr of the failed invocation, if the tool ran at all.
    pub fn output(&self) -> Option<&str> {
        match self {
            ToolError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Staging error: {message}")]
    Staging {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Transcode error: {0}")]
    Transcode(#[source] ToolError),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[source] ToolError),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Duplicate catalog record: {0}")]
    DuplicateRecord(Uuid),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Compensation for prefix {prefix} failed: {message}")]
    Compensation { prefix: String, message: String },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub fn staging(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        PipelineError::Staging {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Captured tool output for transcode/thumbnail failures.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            PipelineError::Transcode(e) | PipelineError::Thumbnail(e) => e.output(),
            _ => None,
        }
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            PipelineError::Validation(_) => "Validation",
            PipelineError::Staging { .. } => "Staging",
            PipelineError::Transcode(_) => "Transcode",
            PipelineError::Thumbnail(_) => "Thumbnail",
            PipelineError::Publish(_) => "Publish",
            PipelineError::DuplicateRecord(_) => "DuplicateRecord",
            PipelineError::Persistence(_) => "Persistence",
            PipelineError::Compensation { .. } => "Compensation",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
fn pipeline_error_static_metadata(err: &PipelineError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        PipelineError::Validation(ValidationError::FileTooLarge { .. }) => {
            (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug)
        }
        PipelineError::Validation(_) => (400, "INVALID_UPLOAD", false, LogLevel::Debug),
        PipelineError::Staging { .. } => (500, "STAGING_ERROR", false, LogLevel::Error),
        PipelineError::Transcode(_) => (500, "TRANSCODE_ERROR", false, LogLevel::Error),
        PipelineError::Thumbnail(_) => (500, "THUMBNAIL_ERROR", false, LogLevel::Error),
        PipelineError::Publish(_) => (502, "PUBLISH_ERROR", false, LogLevel::Error),
        PipelineError::DuplicateRecord(_) => (500, "DUPLICATE_RECORD", false, LogLevel::Error),
        PipelineError::Persistence(_) => (500, "PERSISTENCE_ERROR", false, LogLevel::Error),
        PipelineError::Compensation { .. } => (500, "COMPENSATION_ERROR", false, LogLevel::Error),
    }
}

impl ErrorMetadata for PipelineError {
    fn http_status_code(&self) -> u16 {
        pipeline_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        pipeline_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            PipelineError::Validation(e) => e.to_string(),
            PipelineError::Staging { .. } => "Failed to store the uploaded video".to_string(),
            PipelineError::Transcode(_) => "Failed to convert the video for streaming".to_string(),
            PipelineError::Thumbnail(_) => "Failed to generate the video thumbnail".to_string(),
            PipelineError::Publish(_) => "Failed to publish the video".to_string(),
            PipelineError::DuplicateRecord(_)
            | PipelineError::Persistence(_)
            | PipelineError::Compensation { .. } => "Failed to save the video".to_string(),
        }
    }
}
