use std::path::Path;

use streamvault_core::{PipelineConfig, UploadRequest, ValidationError};
use validator::Validate;

/// Extension and size gate applied before any work begins
///
/// Only the container extension is inspected, never the codec.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_upload_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_upload_bytes: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_upload_bytes,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_upload_bytes, config.allowed_extensions.clone())
    }

    /// Accept iff the lowercase extension is allowed and `content_length` is within the ceiling.
    pub fn validate(&self, filename: &str, content_length: u64) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        if content_length == 0 {
            return Err(ValidationError::InvalidMetadata("Upload is empty".to_string()));
        }

        if content_length > self.max_upload_bytes {
            return Err(ValidationError::FileTooLarge {
                size: content_length,
                max: self.max_upload_bytes,
            });
        }

        Ok(())
    }

    /// Metadata checks (title, filename length) followed by [`validate`](Self::validate).
    pub fn validate_request(&self, request: &UploadRequest) -> Result<(), ValidationError> {
        request.validate()?;

        if request.title.trim().is_empty() {
            return Err(ValidationError::InvalidMetadata(
                "Title must not be blank".to_string(),
            ));
        }

        self.validate(&request.filename, request.content_length)
    }
}
