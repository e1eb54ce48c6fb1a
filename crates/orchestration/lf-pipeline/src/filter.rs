//! Page filtering for the lister stage.
//!
//! A listing page goes through two filters:
//! - [`ProcessedSet`]: the first already-processed key ends the listing
//! - [`BackfillFilter`]: objects older than the backfill window are dropped
//!
//! Pages are sorted most-recent-first before filtering. The sort only covers
//! one page; listings spanning several pages are not globally ordered, so the
//! stop-on-processed heuristic is only as good as the per-page order.

mod backfill;
mod processed;

pub use backfill::BackfillFilter;
pub use processed::ProcessedSet;

use chrono::{DateTime, Utc};
use lf_types::ObjectRef;

/// Result of filtering one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageVerdict {
    /// Objects to forward, most recent first
    pub candidates: Vec<ObjectRef>,

    /// Number of objects dropped for being older than the backfill window
    pub too_old: usize,

    /// Key of the already-processed object that ended the listing, if any
    pub stopped_at: Option<String>,
}

impl PageVerdict {
    /// Whether the listing should stop after this page.
    pub fn should_stop(&self) -> bool {
        self.stopped_at.is_some()
    }
}

/// Sort a page most-recent-first and pick the objects to forward.
///
/// Objects are examined in sorted order. The first one whose key is in
/// `processed` ends the page: neither it nor anything after it is forwarded
/// and the verdict asks for no further pages. Otherwise an object is
/// forwarded when it is younger than the backfill window and silently
/// dropped when it is not.
pub fn filter_page(
    mut objects: Vec<ObjectRef>,
    processed: &ProcessedSet,
    backfill: &BackfillFilter,
    now: DateTime<Utc>,
) -> PageVerdict {
    objects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));

    let mut verdict = PageVerdict::default();

    for obj in objects {
        if processed.contains(&obj.key) {
            verdict.stopped_at = Some(obj.key);
            break;
        }

        if backfill.matches(&obj, now) {
            verdict.candidates.push(obj);
        } else {
            verdict.too_old += 1;
        }
    }

    verdict
}
