//! Account metadata from the EC2 instance metadata service.

use async_trait::async_trait;
use aws_config::imds::Client as ImdsClient;
use lf_error::{LfError, Result};
use lf_traits::MetadataResolver;
use lf_types::AccountMetadata;
use serde::Deserialize;
use tracing::debug;

const INSTANCE_IDENTITY_PATH: &str = "/latest/dynamic/instance-identity/document";

/// Fields of the instance identity document we care about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityDocument {
    account_id: String,
    region: String,
}

/// Resolves account id and region from the instance identity document.
#[derive(Debug, Clone)]
pub struct ImdsMetadataResolver {
    client: ImdsClient,
}

impl ImdsMetadataResolver {
    /// Create a resolver with the default IMDS client settings.
    pub fn new() -> Self {
        Self {
            client: ImdsClient::builder().build(),
        }
    }
}

impl Default for ImdsMetadataResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataResolver for ImdsMetadataResolver {
    async fn resolve(&self) -> Result<AccountMetadata> {
        let document = self
            .client
            .get(INSTANCE_IDENTITY_PATH)
            .await
            .map_err(|e| LfError::Metadata(format!("instance identity unavailable: {e}")))?;

        let metadata = parse_identity_document(document.as_ref())?;
        debug!(
            account_id = %metadata.account_id,
            region = %metadata.region,
            "Resolved account metadata from instance identity"
        );
        Ok(metadata)
    }
}

fn parse_identity_document(raw: &str) -> Result<AccountMetadata> {
    let doc: IdentityDocument = serde_json::from_str(raw)
        .map_err(|e| LfError::Metadata(format!("invalid instance identity document: {e}")))?;

    if doc.account_id.is_empty() || doc.region.is_empty() {
        return Err(LfError::Metadata(
            "instance identity document lacks account id or region".to_string(),
        ));
    }

    Ok(AccountMetadata::new(doc.account_id, doc.region))
}
