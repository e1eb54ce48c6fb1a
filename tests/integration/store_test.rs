//! S3 object store tests against LocalStack.

use crate::common::{LocalStackTestContext, access_log_lines};
use futures::TryStreamExt;
use lf_error::{DownloadError, LfError};
use lf_pipeline::{S3ObjectStore, create_s3_client};
use lf_traits::ObjectStore;

const BUCKET: &str = "test-logfetch-store";

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_list_page_and_get_object() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    ctx.create_bucket(BUCKET).await.unwrap();
    ctx.clear_prefix(BUCKET, "logs/").await.unwrap();

    let body = access_log_lines(20);
    ctx.upload_log(BUCKET, "logs/a.log", &body).await.unwrap();
    ctx.upload_log(BUCKET, "logs/b.log", "short").await.unwrap();
    ctx.upload_log(BUCKET, "other/c.log", "elsewhere").await.unwrap();

    let client = create_s3_client(&ctx.s3_config()).await.unwrap();
    let store = S3ObjectStore::new(client);

    let page = store.list_page(BUCKET, "logs/", None).await.unwrap();
    let mut keys: Vec<_> = page.objects.iter().map(|o| o.key.as_str()).collect();
    keys.sort();
    assert_eq!(keys, vec!["logs/a.log", "logs/b.log"]);
    assert!(page.is_last());

    let chunks: Vec<_> = store
        .get_object(BUCKET, "logs/a.log")
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    let downloaded: Vec<u8> = chunks.concat();
    assert_eq!(downloaded, body.as_bytes());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_get_missing_object() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    ctx.create_bucket(BUCKET).await.unwrap();

    let client = create_s3_client(&ctx.s3_config()).await.unwrap();
    let store = S3ObjectStore::new(client);

    let result = store.get_object(BUCKET, "logs/does-not-exist.log").await;
    assert!(matches!(
        result,
        Err(LfError::Download(DownloadError::Request { .. }))
    ));
}
