//! Entity descriptors for the monitored log sources.

use chrono::NaiveDate;
use lf_error::{LfError, Result};
use serde::{Deserialize, Serialize};

/// Service name used in load balancer access log keys.
pub const ELASTIC_LOAD_BALANCING: &str = "elasticloadbalancing";

/// Account id and region of the account that owns a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
    /// AWS account id (12 digits)
    pub account_id: String,

    /// AWS region the load balancer runs in
    pub region: String,
}

impl AccountMetadata {
    /// Create account metadata from explicit values.
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }
}

/// Kind of log source an [`Entity`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Elastic load balancer access logs
    LoadBalancer,

    /// CloudFront distribution access logs
    Cdn,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadBalancer => write!(f, "load_balancer"),
            Self::Cdn => write!(f, "cdn"),
        }
    }
}

/// Access logs of one load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerEntity {
    /// Bucket the logs are delivered to
    pub bucket: String,

    /// Key prefix configured for log delivery
    pub prefix_root: String,

    /// Account owning the load balancer
    pub account_id: String,

    /// Region of the load balancer
    pub region: String,

    /// Load balancer name
    pub name: String,
}

/// Access logs of one CDN distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnEntity {
    /// Bucket the logs are delivered to
    pub bucket: String,

    /// Key prefix configured for log delivery
    pub prefix_root: String,

    /// Distribution id (e.g. `EDFDVBD6EXAMPLE`)
    pub distribution_id: String,
}

/// A monitored log source.
///
/// The listing prefix is a pure function of the entity and a UTC calendar
/// day, and matches the key layout the log delivery service writes.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use lf_types::Entity;
///
/// let entity = Entity::cdn("my-logs", "cflogs", "EDFDVBD6EXAMPLE");
/// let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
///
/// assert_eq!(entity.object_prefix(day), "cflogs/EDFDVBD6EXAMPLE.2024-03-05");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// Load balancer access logs
    LoadBalancer(LoadBalancerEntity),

    /// CDN distribution access logs
    Cdn(CdnEntity),
}

impl Entity {
    /// Describe a load balancer using already-resolved account metadata.
    ///
    /// Fails if the metadata lacks an account id or region, since the
    /// resulting prefix could never match a delivered log key.
    pub fn load_balancer(
        bucket: impl Into<String>,
        prefix_root: impl Into<String>,
        name: impl Into<String>,
        metadata: &AccountMetadata,
    ) -> Result<Self> {
        if metadata.account_id.trim().is_empty() {
            return Err(LfError::Metadata("account id is empty".to_string()));
        }
        if metadata.region.trim().is_empty() {
            return Err(LfError::Metadata("region is empty".to_string()));
        }

        Ok(Self::LoadBalancer(LoadBalancerEntity {
            bucket: bucket.into(),
            prefix_root: prefix_root.into(),
            account_id: metadata.account_id.clone(),
            region: metadata.region.clone(),
            name: name.into(),
        }))
    }

    /// Describe a CDN distribution.
    pub fn cdn(
        bucket: impl Into<String>,
        prefix_root: impl Into<String>,
        distribution_id: impl Into<String>,
    ) -> Self {
        Self::Cdn(CdnEntity {
            bucket: bucket.into(),
            prefix_root: prefix_root.into(),
            distribution_id: distribution_id.into(),
        })
    }

    /// Bucket to list and fetch from.
    pub fn bucket(&self) -> &str {
        match self {
            Self::LoadBalancer(lb) => &lb.bucket,
            Self::Cdn(cdn) => &cdn.bucket,
        }
    }

    /// Key prefix scoping a listing to one day of this entity's logs.
    pub fn object_prefix(&self, day: NaiveDate) -> String {
        match self {
            Self::LoadBalancer(lb) => format!(
                "{root}/AWSLogs/{account}/{service}/{region}/{day}/{account}_{service}_{region}_{name}",
                root = lb.prefix_root,
                account = lb.account_id,
                service = ELASTIC_LOAD_BALANCING,
                region = lb.region,
                day = day.format("%Y/%m/%d"),
                name = lb.name,
            ),
            Self::Cdn(cdn) => format!(
                "{}/{}.{}",
                cdn.prefix_root,
                cdn.distribution_id,
                day.format("%Y-%m-%d")
            ),
        }
    }

    /// Short identifier used in log fields.
    pub fn identifier(&self) -> &str {
        match self {
            Self::LoadBalancer(lb) => &lb.name,
            Self::Cdn(cdn) => &cdn.distribution_id,
        }
    }

    /// Kind of log source.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::LoadBalancer(_) => EntityKind::LoadBalancer,
            Self::Cdn(_) => EntityKind::Cdn,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
