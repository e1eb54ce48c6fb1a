//! Processed-object oracle trait.

use async_trait::async_trait;
use lf_error::Result;
use std::sync::Arc;

/// Source of truth for which object keys were already retrieved.
///
/// The pipeline queries this once per polling cycle and treats the answer as
/// read-only. Marking objects processed is the consumer's job.
#[async_trait]
pub trait ProcessedObjects: Send + Sync {
    /// Returns the keys already retrieved for the entity.
    async fn processed_objects(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: ProcessedObjects + ?Sized> ProcessedObjects for Arc<T> {
    async fn processed_objects(&self) -> Result<Vec<String>> {
        (**self).processed_objects().await
    }
}
