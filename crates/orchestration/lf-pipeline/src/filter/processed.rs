//! Set of keys already retrieved for an entity.

use std::collections::HashSet;

/// Keys the processed-object oracle reported for one polling cycle.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    keys: HashSet<String>,
}

impl ProcessedSet {
    /// Check whether a key was already processed.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of known keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key is known.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<Vec<String>> for ProcessedSet {
    fn from(keys: Vec<String>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl FromIterator<String> for ProcessedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
