//! [`ObjectStore`] backed by S3.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::Object;
use chrono::DateTime;
use lf_error::{DownloadError, LfError, Result};
use lf_traits::{ByteStream, ListPage, ObjectStore};
use lf_types::ObjectRef;
use tracing::{debug, trace};

/// S3 implementation of [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Wrap an existing S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Convert a listed object, skipping directory markers and entries without
/// a key or timestamp.
fn to_object_ref(obj: Object) -> Option<ObjectRef> {
    let key = obj.key?;
    if key.is_empty() || key.ends_with('/') {
        return None;
    }

    let last_modified = obj
        .last_modified
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))?;

    Some(ObjectRef::new(
        key,
        obj.size.unwrap_or(0).max(0) as u64,
        last_modified,
    ))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListPage> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| {
                LfError::Listing(format!(
                    "Failed to list s3://{}/{}: {}",
                    bucket, prefix, e
                ))
            })?;

        let objects: Vec<ObjectRef> = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(to_object_ref)
            .collect();

        let next = if resp.is_truncated == Some(true) {
            resp.next_continuation_token
        } else {
            None
        };

        trace!(
            bucket = bucket,
            prefix = prefix,
            objects = objects.len(),
            more = next.is_some(),
            "Listed page"
        );

        Ok(ListPage::new(objects, next))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream> {
        debug!(bucket = bucket, key = key, "Requesting object from S3");

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| DownloadError::Request {
                key: key.to_string(),
                message: format!("s3://{}/{}: {}", bucket, key, e),
            })?;

        let key = key.to_string();
        let chunks = futures::stream::try_unfold(output.body, move |mut body| {
            let key = key.clone();
            async move {
                match body.try_next().await {
                    Ok(Some(chunk)) => Ok(Some((chunk, body))),
                    Ok(None) => Ok(None),
                    Err(e) => Err(LfError::Download(DownloadError::Transfer {
                        key,
                        message: e.to_string(),
                    })),
                }
            }
        });

        Ok(Box::pin(chunks))
    }
}
