//! In-process processed-object oracle.

use async_trait::async_trait;
use lf_error::Result;
use lf_traits::ProcessedObjects;
use std::collections::HashSet;
use std::sync::RwLock;

/// Processed-object set kept in memory for the lifetime of the process.
///
/// The consumer marks each delivered object once it is done with it; the
/// pipeline reads the set at the start of every cycle.
#[derive(Debug, Default)]
pub struct MemoryProcessedObjects {
    keys: RwLock<HashSet<String>>,
}

impl MemoryProcessedObjects {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set seeded with previously processed keys.
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: RwLock::new(keys.into_iter().map(Into::into).collect()),
        }
    }

    /// Record a key as processed. Returns false if it was already known.
    pub fn mark_processed(&self, key: impl Into<String>) -> bool {
        self.keys
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.into())
    }

    /// Number of processed keys.
    pub fn len(&self) -> usize {
        self.keys
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether no key was processed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProcessedObjects for MemoryProcessedObjects {
    async fn processed_objects(&self) -> Result<Vec<String>> {
        let keys = self
            .keys
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(keys.iter().cloned().collect())
    }
}
