//! Streamvault Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! errors shared by every stage of the ingestion pipeline.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, DatabaseConfig, LogFormat, PipelineConfig, StorageConfig};
pub use error::{ErrorMetadata, LogLevel, PipelineError, PipelineResult, ToolError};
pub use models::{CatalogRecord, NewCatalogRecord, StagedVideo, UploadRequest};
pub use validation::ValidationError;
