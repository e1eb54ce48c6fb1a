//! End-to-end pipeline tests against LocalStack.

use crate::common::{LocalStackTestContext, access_log_lines};
use chrono::Utc;
use lf_error::LfError;
use lf_pipeline::{
    MemoryProcessedObjects, Pipeline, PipelineConfig, S3ObjectStore, create_s3_client,
};
use lf_types::Entity;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const BUCKET: &str = "test-logfetch-cdn";
const DISTRIBUTION: &str = "EINTEGRATION01";

fn today_key(suffix: &str) -> String {
    let entity = Entity::cdn(BUCKET, "cflogs", DISTRIBUTION);
    format!(
        "{}-{}.gz",
        entity.object_prefix(Utc::now().date_naive()),
        suffix
    )
}

async fn store(ctx: &LocalStackTestContext) -> Arc<S3ObjectStore> {
    let client = create_s3_client(&ctx.s3_config()).await.unwrap();
    Arc::new(S3ObjectStore::new(client))
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_pipeline_downloads_new_objects_once() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    ctx.create_bucket(BUCKET).await.unwrap();
    ctx.clear_prefix(BUCKET, "cflogs/").await.unwrap();

    let first = today_key("10.aaaa");
    let second = today_key("11.bbbb");
    ctx.upload_log(BUCKET, &first, &access_log_lines(5)).await.unwrap();
    ctx.upload_log(BUCKET, &second, &access_log_lines(8)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new().with_temp_dir(dir.path());
    let oracle = Arc::new(MemoryProcessedObjects::new());
    let entity = Entity::cdn(BUCKET, "cflogs", DISTRIBUTION);

    let pipeline = Pipeline::new(store(&ctx).await, oracle.clone(), entity.clone(), config.clone())
        .unwrap();
    let mut handle = pipeline.start(CancellationToken::new());

    let mut keys = Vec::new();
    for _ in 0..2 {
        let record = tokio::time::timeout(Duration::from_secs(30), handle.recv())
            .await
            .expect("timed out waiting for a record")
            .expect("pipeline stopped early");

        let contents = std::fs::read_to_string(&record.path).unwrap();
        assert!(contents.starts_with("2024-03-05\t10:00:00"));
        assert_eq!(record.bytes, contents.len() as u64);

        oracle.mark_processed(record.key.clone());
        keys.push(record.key);
    }
    keys.sort();
    assert_eq!(keys, vec![first.clone(), second.clone()]);

    handle.shutdown();
    handle.join().await.unwrap();

    // A fresh pipeline sharing the oracle finds nothing new.
    let pipeline = Pipeline::new(store(&ctx).await, oracle, entity, config).unwrap();
    let mut handle = pipeline.start(CancellationToken::new());

    let next = tokio::time::timeout(Duration::from_secs(3), handle.recv()).await;
    assert!(next.is_err(), "already processed objects were downloaded again");

    handle.shutdown();
    handle.join().await.unwrap();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_pipeline_missing_bucket_is_fatal() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let entity = Entity::cdn("test-logfetch-no-such-bucket", "cflogs", DISTRIBUTION);
    let pipeline = Pipeline::new(
        store(&ctx).await,
        Arc::new(MemoryProcessedObjects::new()),
        entity,
        PipelineConfig::new().with_temp_dir(dir.path()),
    )
    .unwrap();
    let mut handle = pipeline.start(CancellationToken::new());

    let next = tokio::time::timeout(Duration::from_secs(30), handle.recv())
        .await
        .expect("pipeline kept running after a listing failure");
    assert!(next.is_none());
    assert!(matches!(handle.join().await, Err(LfError::Listing(_))));
}
