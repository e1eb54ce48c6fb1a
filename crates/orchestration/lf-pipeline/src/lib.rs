//! lf-pipeline - Discovery and download pipeline for cloud access logs.
//!
//! For one log-producing entity (a load balancer or a CDN distribution)
//! the pipeline periodically lists today's log objects, skips the ones
//! already processed or too old, downloads the rest into local files and
//! hands each file to the consumer:
//!
//! - Lister: one cycle per polling interval, most recent objects first
//! - Downloader: one object at a time, one fresh temporary file per object
//! - Cancellation through a [`CancellationToken`](tokio_util::sync::CancellationToken)
//!
//! # Example
//!
//! ```ignore
//! use lf_pipeline::{MemoryProcessedObjects, Pipeline, PipelineConfig, S3Config, S3ObjectStore, create_s3_client};
//! use lf_types::Entity;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let client = create_s3_client(&S3Config::new()).await?;
//! let store = Arc::new(S3ObjectStore::new(client));
//! let oracle = Arc::new(MemoryProcessedObjects::new());
//! let entity = Entity::cdn("cf-logs", "cflogs", "EDFDVBD6EXAMPLE");
//!
//! let pipeline = Pipeline::new(store, oracle.clone(), entity, PipelineConfig::new())?;
//! let mut handle = pipeline.start(CancellationToken::new());
//!
//! while let Some(record) = handle.recv().await {
//!     println!("{} -> {}", record.key, record.path.display());
//!     oracle.mark_processed(record.key);
//! }
//! handle.join().await?;
//! ```

pub mod config;
pub mod coordinator;
pub mod downloader;
pub mod filter;
pub mod lister;
pub mod metadata;
pub mod oracle;
pub mod s3;
pub mod stats;

#[cfg(test)]
mod testing;

pub use config::PipelineConfig;
pub use coordinator::{Pipeline, PipelineHandle};
pub use downloader::Downloader;
pub use filter::{BackfillFilter, PageVerdict, ProcessedSet, filter_page};
pub use lister::{CycleEnd, Lister};
pub use metadata::ImdsMetadataResolver;
pub use oracle::MemoryProcessedObjects;
pub use s3::{S3Config, S3ObjectStore, create_s3_client};
pub use stats::{CycleStats, PipelineStats, StatsSnapshot};
