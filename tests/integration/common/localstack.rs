//! LocalStack test context and utilities.

use aws_sdk_s3::Client as S3Client;
use lf_pipeline::S3Config;

const TEST_ACCESS_KEY: &str = "test";
const TEST_SECRET_KEY: &str = "test";

/// LocalStack test context providing an S3 client.
pub struct LocalStackTestContext {
    pub s3: S3Client,
    pub endpoint: String,
    pub region: String,
}

impl LocalStackTestContext {
    /// Create a new LocalStack test context.
    ///
    /// Uses the `LOCALSTACK_ENDPOINT` environment variable if set,
    /// otherwise defaults to `http://localhost:4566`.
    pub async fn new() -> Self {
        let endpoint = std::env::var("LOCALSTACK_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_string());
        let region = "us-east-1".to_string();

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                TEST_ACCESS_KEY,
                TEST_SECRET_KEY,
                None,
                None,
                "localstack",
            ))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Self {
            s3: S3Client::from_conf(s3_config),
            endpoint,
            region,
        }
    }

    /// S3 configuration for pipeline clients pointing at LocalStack.
    pub fn s3_config(&self) -> S3Config {
        S3Config::new()
            .with_endpoint(&self.endpoint)
            .with_region(&self.region)
            .with_credentials(TEST_ACCESS_KEY, TEST_SECRET_KEY)
            .with_max_attempts(1)
    }

    /// Check if LocalStack is available and healthy.
    pub async fn is_available(&self) -> bool {
        // Fails fast if LocalStack isn't running
        self.s3.list_buckets().send().await.is_ok()
    }

    /// Create an S3 bucket for testing.
    pub async fn create_bucket(&self, name: &str) -> Result<(), aws_sdk_s3::Error> {
        let buckets = self.s3.list_buckets().send().await?;
        let exists = buckets
            .buckets()
            .iter()
            .any(|b| b.name().unwrap_or_default() == name);

        if !exists {
            self.s3.create_bucket().bucket(name).send().await?;
        }
        Ok(())
    }

    /// Delete every object under `prefix`, so reruns start clean.
    pub async fn clear_prefix(&self, bucket: &str, prefix: &str) -> Result<(), aws_sdk_s3::Error> {
        let listed = self
            .s3
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await?;

        for key in listed.contents().iter().filter_map(|o| o.key()) {
            self.s3.delete_object().bucket(bucket).key(key).send().await?;
        }
        Ok(())
    }

    /// Upload a log object.
    pub async fn upload_log(
        &self,
        bucket: &str,
        key: &str,
        data: &str,
    ) -> Result<(), aws_sdk_s3::Error> {
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(data.as_bytes().to_vec().into())
            .content_type("text/plain")
            .send()
            .await?;
        Ok(())
    }
}

/// Generate tab-separated access log lines.
pub fn access_log_lines(num_lines: usize) -> String {
    (0..num_lines)
        .map(|i| {
            format!(
                "2024-03-05\t10:{:02}:00\tIAD89-C1\t{}\t192.0.2.{}\tGET\t/index.html\t200",
                i % 60,
                512 + i,
                i % 255
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
