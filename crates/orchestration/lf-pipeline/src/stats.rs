//! Statistics for pipeline runs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics collected during one listing cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleStats {
    /// When the cycle started
    pub started_at: Option<DateTime<Utc>>,

    /// When the cycle completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Prefix the cycle listed
    pub prefix: String,

    /// Number of listing pages fetched
    pub pages: usize,

    /// Objects seen across all pages (before filtering)
    pub objects_listed: usize,

    /// Objects handed to the download stage
    pub objects_forwarded: usize,

    /// Objects dropped for being older than the backfill window
    pub objects_too_old: usize,

    /// Size of the processed-object set used for this cycle
    pub processed_known: usize,

    /// Whether the listing stopped at an already-processed key
    pub stopped_early: bool,

    /// Whether the processed-object lookup failed and an empty set was used
    pub oracle_degraded: bool,
}

impl CycleStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            started_at: Some(Utc::now()),
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Mark the cycle as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record a fetched page and its size.
    pub fn record_page(&mut self, objects: usize) {
        self.pages += 1;
        self.objects_listed += objects;
    }

    /// Get the duration of the cycle.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Counters shared by both stages of a running pipeline.
///
/// Updated with relaxed atomics from the lister and downloader tasks and
/// read through [`snapshot`](PipelineStats::snapshot).
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// When the pipeline started
    started_at: Option<DateTime<Utc>>,

    /// Completed listing cycles
    cycles: AtomicU64,

    /// Objects seen in listings
    objects_listed: AtomicU64,

    /// Objects handed to the download stage
    objects_forwarded: AtomicU64,

    /// Objects dropped for age
    objects_too_old: AtomicU64,

    /// Cycles whose processed-object lookup failed
    oracle_failures: AtomicU64,

    /// Successful downloads
    downloads_succeeded: AtomicU64,

    /// Failed downloads
    downloads_failed: AtomicU64,

    /// Bytes written to local storage
    bytes_downloaded: AtomicU64,
}

impl PipelineStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Fold a finished cycle into the totals.
    pub fn record_cycle(&self, cycle: &CycleStats) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.objects_listed
            .fetch_add(cycle.objects_listed as u64, Ordering::Relaxed);
        self.objects_too_old
            .fetch_add(cycle.objects_too_old as u64, Ordering::Relaxed);
        if cycle.oracle_degraded {
            self.oracle_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an object handed to the download stage.
    pub fn record_forwarded(&self) {
        self.objects_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful download.
    pub fn record_download(&self, bytes: u64) {
        self.downloads_succeeded.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a failed download.
    pub fn record_download_failure(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Get the number of successful downloads.
    pub fn downloads_succeeded(&self) -> u64 {
        self.downloads_succeeded.load(Ordering::Relaxed)
    }

    /// Get the number of failed downloads.
    pub fn downloads_failed(&self) -> u64 {
        self.downloads_failed.load(Ordering::Relaxed)
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            taken_at: Utc::now(),
            cycles: self.cycles(),
            objects_listed: self.objects_listed.load(Ordering::Relaxed),
            objects_forwarded: self.objects_forwarded.load(Ordering::Relaxed),
            objects_too_old: self.objects_too_old.load(Ordering::Relaxed),
            oracle_failures: self.oracle_failures.load(Ordering::Relaxed),
            downloads_succeeded: self.downloads_succeeded(),
            downloads_failed: self.downloads_failed(),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub started_at: Option<DateTime<Utc>>,
    pub taken_at: DateTime<Utc>,
    pub cycles: u64,
    pub objects_listed: u64,
    pub objects_forwarded: u64,
    pub objects_too_old: u64,
    pub oracle_failures: u64,
    pub downloads_succeeded: u64,
    pub downloads_failed: u64,
    pub bytes_downloaded: u64,
}

impl StatsSnapshot {
    /// Time the pipeline has been running.
    pub fn uptime(&self) -> Option<Duration> {
        self.started_at.map(|start| self.taken_at - start)
    }
}
