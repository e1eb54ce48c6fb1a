//! Account metadata resolution for load balancer entities.

use async_trait::async_trait;
use lf_error::{LfError, Result};
use lf_types::{AccountMetadata, Entity};

/// Resolves the account id and region the process runs under.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Looks up account id and region.
    async fn resolve(&self) -> Result<AccountMetadata>;
}

/// Resolver returning fixed, explicitly configured values.
#[derive(Debug, Clone)]
pub struct StaticMetadata {
    metadata: AccountMetadata,
}

impl StaticMetadata {
    /// Create a resolver that always returns the given values.
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            metadata: AccountMetadata::new(account_id, region),
        }
    }
}

#[async_trait]
impl MetadataResolver for StaticMetadata {
    async fn resolve(&self) -> Result<AccountMetadata> {
        Ok(self.metadata.clone())
    }
}

/// Build a load balancer entity, resolving its account metadata first.
///
/// Resolution failures are returned as [`LfError::Metadata`]; there is no
/// degraded descriptor to fall back to.
pub async fn resolve_load_balancer<R: MetadataResolver + ?Sized>(
    resolver: &R,
    bucket: impl Into<String>,
    prefix_root: impl Into<String>,
    name: impl Into<String>,
) -> Result<Entity> {
    let metadata = resolver.resolve().await.map_err(|e| match e {
        LfError::Metadata(msg) => LfError::Metadata(msg),
        other => LfError::Metadata(other.to_string()),
    })?;

    Entity::load_balancer(bucket, prefix_root, name, &metadata)
}
