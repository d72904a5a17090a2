//! Upload validation errors
//!
//! The validator itself lives in `streamvault-processing`; the error type is defined
//! here so [`PipelineError`](crate::PipelineError) can carry it.

/// Reasons an upload is rejected before any work begins
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Invalid upload metadata: {0}")]
    InvalidMetadata(String),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(err: validator::ValidationErrors) -> Self {
        ValidationError::InvalidMetadata(err.to_string())
    }
}
