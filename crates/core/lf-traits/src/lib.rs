//! Collaborator traits for logfetch.
//!
//! This crate defines the boundaries between the pipeline and the outside
//! world:
//! - [`ObjectStore`] - Paged listing and object retrieval (S3, in-memory)
//! - [`ProcessedObjects`] - Keys already retrieved for an entity
//! - [`MetadataResolver`] - Account id and region lookup for load balancers

pub mod metadata;
pub mod oracle;
pub mod store;

pub use metadata::*;
pub use oracle::*;
pub use store::*;
