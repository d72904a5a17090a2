use std::fmt;
use std::pin::Pin;

use tokio::io::AsyncRead;
use validator::Validate;

/// Raw upload body as handed over by the request layer.
pub type UploadBody = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Inbound upload. Lives only for the duration of one ingestion run.
#[derive(Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub description: String,
    /// Filename declared by the client; only its base name is ever used on disk.
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// Declared content length in bytes.
    pub content_length: u64,
    pub body: UploadBody,
}

impl UploadRequest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        filename: impl Into<String>,
        content_length: u64,
        body: UploadBody,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            filename: filename.into(),
            content_length,
            body,
        }
    }

    /// Build a request from an in-memory buffer.
    pub fn from_bytes(
        title: impl Into<String>,
        description: impl Into<String>,
        filename: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        let content_length = data.len() as u64;
        Self::new(
            title,
            description,
            filename,
            content_length,
            Box::pin(std::io::Cursor::new(data)),
        )
    }
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("filename", &self.filename)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
