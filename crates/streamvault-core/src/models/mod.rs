pub mod upload;
pub mod video;

pub use upload::{UploadBody, UploadRequest};
pub use video::{CatalogRecord, NewCatalogRecord, StagedVideo};
