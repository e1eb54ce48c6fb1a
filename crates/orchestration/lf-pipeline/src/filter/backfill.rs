//! Recency filtering by backfill window.

use chrono::{DateTime, Duration, Utc};
use lf_error::{LfError, Result};
use lf_types::ObjectRef;

/// Keeps objects modified less than `window` ago.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use lf_pipeline::filter::BackfillFilter;
/// use lf_types::ObjectRef;
///
/// let filter = BackfillFilter::new(Duration::hours(1));
/// let now = Utc::now();
///
/// assert!(filter.matches(&ObjectRef::new("a", 1, now - Duration::minutes(10)), now));
/// assert!(!filter.matches(&ObjectRef::new("b", 1, now - Duration::hours(2)), now));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillFilter {
    window: Duration,
}

impl BackfillFilter {
    /// Create a filter for the given window.
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Create a filter from a std Duration, as found in configuration.
    pub fn from_std(window: std::time::Duration) -> Result<Self> {
        let window = Duration::from_std(window)
            .map_err(|e| LfError::Config(format!("Invalid backfill window: {e}")))?;
        Ok(Self::new(window))
    }

    /// Check whether an object is young enough to download.
    pub fn matches(&self, obj: &ObjectRef, now: DateTime<Utc>) -> bool {
        obj.age(now) < self.window
    }

    /// The configured window.
    pub fn window(&self) -> Duration {
        self.window
    }
}
