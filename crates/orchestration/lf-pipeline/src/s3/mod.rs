//! S3 access for the pipeline.
//!
//! - Client configuration with LocalStack support
//! - [`S3ObjectStore`], the [`ObjectStore`](lf_traits::ObjectStore) backed by S3

mod client;
mod store;

pub use client::{S3Config, create_s3_client};
pub use store::S3ObjectStore;
