//! Test helpers: an ingestion pipeline wired to in-memory collaborators.
//!
//! Every harness gets its own temp storage roots, so tests can run in parallel.

pub mod media;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use streamvault_core::{PipelineConfig, UploadRequest};
use streamvault_db::InMemoryCatalog;
use streamvault_processing::{CatalogRecorder, HlsPublisher, IngestionPipeline, Recorder};
use streamvault_storage::MemoryBlobStore;
use tempfile::TempDir;

pub use media::FakeMediaToolkit;

pub struct TestHarness {
    pub root: TempDir,
    pub config: PipelineConfig,
    pub media: Arc<FakeMediaToolkit>,
    pub store: MemoryBlobStore,
    pub catalog: InMemoryCatalog,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_media(FakeMediaToolkit::default())
    }

    pub fn with_media(media: FakeMediaToolkit) -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp directory");
        let config = PipelineConfig::new(root.path().join("videos"), root.path().join("temp"));
        Self {
            root,
            config,
            media: Arc::new(media),
            store: MemoryBlobStore::new(),
            catalog: InMemoryCatalog::new(),
        }
    }

    pub fn pipeline(&self) -> IngestionPipeline {
        self.pipeline_with_recorder(Arc::new(CatalogRecorder::new(Arc::new(
            self.catalog.clone(),
        ))))
    }

    pub fn pipeline_with_recorder(&self, recorder: Arc<dyn Recorder>) -> IngestionPipeline {
        IngestionPipeline::new(
            self.config.clone(),
            self.media.clone(),
            self.media.clone(),
            self.media.clone(),
            Arc::new(HlsPublisher::new(Arc::new(self.store.clone()))),
            recorder,
        )
    }

    /// Everything left under both local roots.
    pub fn local_entries(&self) -> Vec<PathBuf> {
        let mut entries = list_dir(&self.config.storage_root);
        entries.extend(list_dir(&self.config.output_root));
        entries
    }

    /// Remote keys under the prefix of a published output directory.
    pub fn remote_keys_for(&self, output_dir: &Path) -> Vec<String> {
        let prefix = format!(
            "{}/",
            output_dir.file_name().unwrap().to_str().unwrap()
        );
        self.store
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(&prefix))
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn list_dir(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

pub fn upload(filename: &str) -> UploadRequest {
    UploadRequest::from_bytes(
        "Holiday",
        "Two weeks on the coast",
        filename,
        b"\x00\x00\x00\x18ftypmp42".to_vec(),
    )
}
