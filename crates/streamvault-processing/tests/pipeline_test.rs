#[path = "helpers/mod.rs"]
mod helpers;

use async_trait::async_trait;
use futures::future::join_all;
use helpers::{upload, FakeMediaToolkit, TestHarness};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use streamvault_core::{
    CatalogRecord, ErrorMetadata, PipelineError, PipelineResult, StagedVideo, ValidationError,
};
use streamvault_db::Catalog;
use streamvault_processing::Recorder;
use uuid::Uuid;

#[tokio::test]
async fn test_successful_ingestion() {
    let harness = TestHarness::new();
    let owner = Uuid::new_v4();

    let record = harness
        .pipeline()
        .run(upload("clip.mp4"), owner)
        .await
        .unwrap();

    assert_eq!(record.title, "Holiday");
    assert_eq!(record.description, "Two weeks on the coast");
    assert_eq!(record.owner_id, owner);
    assert_eq!(record.duration, "1:24");
    assert_eq!(record.views, 0);

    let prefix = format!("{}_clip", record.id);
    assert!(record.manifest_url.ends_with(&format!("{}/output.m3u8", prefix)));
    assert_eq!(
        record.thumbnail_url.as_deref(),
        Some(format!("https://videos.s3.us-east-1.amazonaws.com/{}/thumbnail.webp", prefix).as_str())
    );

    let mut keys = harness.store.keys();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            format!("{}/output.m3u8", prefix),
            format!("{}/output0.ts", prefix),
            format!("{}/output1.ts", prefix),
            format!("{}/output2.ts", prefix),
            format!("{}/thumbnail.webp", prefix),
        ]
    );

    let stored = harness.catalog.get(record.id).await.unwrap();
    assert_eq!(stored, Some(record));
    assert!(harness.local_entries().is_empty());
}

#[tokio::test]
async fn test_output_directory_is_named_after_unique_file() {
    let harness = TestHarness::new();
    let record = harness
        .pipeline()
        .run(upload("../../etc/clip.mov"), Uuid::new_v4())
        .await
        .unwrap();

    let dirs = harness.media.output_dirs();
    assert_eq!(dirs, vec![harness.config.output_root.join(format!("{}_clip", record.id))]);
}

#[tokio::test]
async fn test_rejected_upload_touches_nothing() {
    let harness = TestHarness::new();

    let err = harness
        .pipeline()
        .run(upload("notes.txt"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::InvalidExtension { .. })
    ));
    assert_eq!(err.http_status_code(), 400);
    assert!(harness.local_entries().is_empty());
    assert!(harness.media.output_dirs().is_empty());
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn test_probe_failure_aborts_before_transcoding() {
    let harness = TestHarness::with_media(FakeMediaToolkit {
        fail_probe: true,
        ..Default::default()
    });

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Staging { .. }));
    assert!(harness.media.output_dirs().is_empty());
    assert!(harness.local_entries().is_empty());
}

#[tokio::test]
async fn test_transcode_failure_surfaces_tool_output() {
    let harness = TestHarness::with_media(FakeMediaToolkit {
        fail_transcode: Some("clip.mp4: moov atom not found".to_string()),
        ..Default::default()
    });

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Transcode(_)));
    assert_eq!(err.tool_output(), Some("clip.mp4: moov atom not found"));
    assert!(harness.local_entries().is_empty());
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn test_thumbnail_failure_cleans_up() {
    let harness = TestHarness::with_media(FakeMediaToolkit {
        fail_thumbnail: Some("Output file is empty, nothing was encoded".to_string()),
        ..Default::default()
    });

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Thumbnail(_)));
    assert!(err.tool_output().unwrap().contains("nothing was encoded"));
    assert!(harness.local_entries().is_empty());
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn test_video_shorter_than_thumbnail_offset_fails() {
    let harness = TestHarness::with_media(FakeMediaToolkit {
        duration: 5.2,
        ..Default::default()
    });

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Thumbnail(_)));
    assert!(harness.local_entries().is_empty());
    assert!(harness.catalog.is_empty());
}

#[tokio::test]
async fn test_missing_manifest_is_never_published() {
    let harness = TestHarness::with_media(FakeMediaToolkit {
        omit_manifest: true,
        ..Default::default()
    });

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Publish(ref m) if m.contains("no manifest found")));
    assert!(harness.store.is_empty());
    assert!(harness.local_entries().is_empty());
}

#[tokio::test]
async fn test_partial_publish_is_not_rolled_back() {
    let harness = TestHarness::new();
    harness.store.fail_put_after(2);

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Publish(_)));
    assert_eq!(harness.store.keys().len(), 2);
    assert_eq!(harness.store.delete_calls(), 0);
    assert!(harness.catalog.is_empty());
    assert!(harness.local_entries().is_empty());
}

#[tokio::test]
async fn test_catalog_failure_deletes_published_prefix() {
    let harness = TestHarness::new();
    harness.catalog.fail_inserts(true);

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Persistence(_)));
    let output_dir = harness.media.output_dirs().pop().unwrap();
    assert!(harness.remote_keys_for(&output_dir).is_empty());
    assert!(harness.store.is_empty());
    assert!(harness.local_entries().is_empty());
}

#[tokio::test]
async fn test_compensation_drains_paginated_listing() {
    let mut harness = TestHarness::with_media(FakeMediaToolkit {
        segments: 25,
        ..Default::default()
    });
    harness.store = harness.store.clone().with_page_size(4);
    harness.catalog.fail_inserts(true);

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Persistence(_)));
    assert!(harness.store.is_empty());
    assert!(harness.store.list_pages() > 1);
    assert_eq!(harness.store.delete_calls(), 1);
}

#[tokio::test]
async fn test_failed_compensation_keeps_original_error() {
    let harness = TestHarness::new();
    harness.catalog.fail_inserts(true);
    harness.store.fail_deletes(true);

    let err = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Persistence(_)));
    assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
    assert!(!harness.store.is_empty());
    assert!(harness.local_entries().is_empty());
}

struct DuplicateRecorder;

#[async_trait]
impl Recorder for DuplicateRecorder {
    async fn record(&self, video: &StagedVideo, _owner_id: Uuid) -> PipelineResult<CatalogRecord> {
        Err(PipelineError::DuplicateRecord(video.id))
    }
}

#[tokio::test]
async fn test_duplicate_record_skips_compensation() {
    let harness = TestHarness::new();

    let err = harness
        .pipeline_with_recorder(Arc::new(DuplicateRecorder))
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::DuplicateRecord(_)));
    assert_eq!(harness.store.delete_calls(), 0);
    assert!(!harness.store.is_empty());
    assert!(harness.local_entries().is_empty());
}

#[tokio::test]
async fn test_keep_local_artifacts_override() {
    let mut harness = TestHarness::new();
    harness.config.keep_local_artifacts = true;

    let record = harness
        .pipeline()
        .run(upload("clip.mp4"), Uuid::new_v4())
        .await
        .unwrap();

    let raw = harness
        .config
        .storage_root
        .join(format!("{}_clip.mp4", record.id));
    let output = harness.config.output_root.join(format!("{}_clip", record.id));
    assert!(raw.is_file());
    assert!(output.join("output.m3u8").is_file());
}

#[tokio::test]
async fn test_concurrent_identical_uploads_stay_distinct() {
    let harness = TestHarness::new();
    let pipeline = harness.pipeline();
    let owner = Uuid::new_v4();

    let runs = (0..8).map(|_| pipeline.run(upload("clip.mp4"), owner));
    let records: Vec<_> = join_all(runs)
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    let ids: HashSet<_> = records.iter().map(|r| r.id).collect();
    let manifests: HashSet<_> = records.iter().map(|r| r.manifest_url.clone()).collect();
    let dirs: HashSet<_> = harness.media.output_dirs().into_iter().collect();
    assert_eq!(ids.len(), 8);
    assert_eq!(manifests.len(), 8);
    assert_eq!(dirs.len(), 8);

    assert_eq!(harness.catalog.list_by_owner(owner).await.unwrap().len(), 8);
    assert_eq!(harness.store.keys().len(), 8 * 5);
    assert!(harness.local_entries().is_empty());
}

#[tokio::test]
async fn test_dropped_run_cleans_up_local_artifacts() {
    let harness = TestHarness::with_media(FakeMediaToolkit {
        hang_transcode: true,
        ..Default::default()
    });
    let pipeline = harness.pipeline();

    let result = tokio::time::timeout(
        Duration::from_millis(100),
        pipeline.run(upload("clip.mp4"), Uuid::new_v4()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(harness.media.output_dirs().len(), 1);
    assert!(harness.local_entries().is_empty());
    assert!(harness.store.is_empty());
    assert!(harness.catalog.is_empty());
}

#[tokio::test]
async fn test_filename_with_dot_runs_keeps_its_name() {
    let harness = TestHarness::new();

    let record = harness
        .pipeline()
        .run(upload("trip..v2.mp4"), Uuid::new_v4())
        .await
        .unwrap();

    let prefix = format!("{}_trip..v2", record.id);
    assert!(record.manifest_url.ends_with(&format!("{}/output.m3u8", prefix)));
    assert_eq!(
        harness.media.output_dirs(),
        vec![harness.config.output_root.join(&prefix)]
    );
}
