//! Lister stage: periodic listing, dedup and recency filtering.

use crate::filter::{BackfillFilter, ProcessedSet, filter_page};
use crate::stats::{CycleStats, PipelineStats};
use chrono::Utc;
use lf_error::{ErrorCategory, LfError, PipelineStage, Result, classify_error};
use lf_traits::{ObjectStore, ProcessedObjects};
use lf_types::{Entity, ObjectRef};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How a listing cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEnd {
    /// All pages were read, or an already-processed key ended the listing
    Completed,

    /// Cancellation was requested mid-cycle
    Cancelled,

    /// The download stage is gone; nothing more can be forwarded
    DownstreamClosed,
}

/// Lists an entity's bucket once per polling interval and forwards the
/// objects worth downloading.
pub struct Lister<S: ObjectStore, O: ProcessedObjects> {
    store: Arc<S>,
    oracle: Arc<O>,
    entity: Arc<Entity>,
    backfill: BackfillFilter,
    poll_interval: Duration,
    tx: mpsc::Sender<ObjectRef>,
    stats: Arc<PipelineStats>,
}

impl<S: ObjectStore, O: ProcessedObjects> Lister<S, O> {
    /// Create a lister forwarding into `tx`.
    pub fn new(
        store: Arc<S>,
        oracle: Arc<O>,
        entity: Arc<Entity>,
        backfill: BackfillFilter,
        poll_interval: Duration,
        tx: mpsc::Sender<ObjectRef>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            store,
            oracle,
            entity,
            backfill,
            poll_interval,
            tx,
            stats,
        }
    }

    /// Run cycles until cancelled, the download stage goes away, or a
    /// listing fails.
    ///
    /// The first cycle starts immediately. A fatal listing error ends the
    /// loop and is returned to the caller, which decides whether to exit.
    /// The loop also ends once the download stage is gone, even while
    /// waiting for the next tick.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(entity = %self.entity, "Lister cancelled while waiting");
                    return Ok(());
                }
                () = self.tx.closed() => {
                    info!(entity = %self.entity, "Download stage closed, stopping lister");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            match self.run_cycle(&cancel).await? {
                CycleEnd::Completed => {
                    info!(entity = %self.entity, "Pausing until the next set of logs are available");
                }
                CycleEnd::Cancelled => {
                    debug!(entity = %self.entity, "Lister cancelled mid-cycle");
                    return Ok(());
                }
                CycleEnd::DownstreamClosed => {
                    info!(entity = %self.entity, "Download stage closed, stopping lister");
                    return Ok(());
                }
            }
        }
    }

    /// Run one list-paginate-filter pass over today's prefix.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleEnd> {
        let bucket = self.entity.bucket();
        let prefix = self.entity.object_prefix(Utc::now().date_naive());
        let mut cycle = CycleStats::new(&prefix);

        info!(
            entity = %self.entity,
            bucket = bucket,
            prefix = %prefix,
            "Getting recent objects"
        );

        let lookup = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(CycleEnd::Cancelled),
            lookup = self.oracle.processed_objects() => lookup,
        };
        let processed = match lookup.map_err(into_oracle_error) {
            Ok(keys) => ProcessedSet::from(keys),
            Err(e) => match classify_error(&e, PipelineStage::OracleLookup) {
                ErrorCategory::Recoverable => {
                    warn!(
                        entity = %self.entity,
                        error = %e,
                        "Failed to fetch processed objects, continuing without dedup"
                    );
                    cycle.oracle_degraded = true;
                    ProcessedSet::default()
                }
                ErrorCategory::Fatal => return Err(e),
            },
        };
        cycle.processed_known = processed.len();

        let end = self.page_through(bucket, &prefix, &processed, &mut cycle, cancel).await;

        cycle.complete();
        self.stats.record_cycle(&cycle);

        let end = match end {
            Ok(end) => end,
            Err(e) if e.is_fatal(PipelineStage::Listing) => {
                error!(
                    entity = %self.entity,
                    bucket = bucket,
                    prefix = %prefix,
                    error = %e,
                    "Error listing/paging bucket objects"
                );
                return Err(e);
            }
            Err(e) => {
                warn!(
                    entity = %self.entity,
                    bucket = bucket,
                    prefix = %prefix,
                    error = %e,
                    "Listing interrupted, retrying next cycle"
                );
                CycleEnd::Completed
            }
        };

        info!(
            entity = %self.entity,
            duration_ms = cycle.duration().map(|d| d.num_milliseconds()),
            pages = cycle.pages,
            listed = cycle.objects_listed,
            forwarded = cycle.objects_forwarded,
            too_old = cycle.objects_too_old,
            stopped_early = cycle.stopped_early,
            "Listing cycle finished"
        );

        Ok(end)
    }

    async fn page_through(
        &self,
        bucket: &str,
        prefix: &str,
        processed: &ProcessedSet,
        cycle: &mut CycleStats,
        cancel: &CancellationToken,
    ) -> Result<CycleEnd> {
        let mut continuation: Option<String> = None;

        loop {
            let page = tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(CycleEnd::Cancelled),
                page = self.store.list_page(bucket, prefix, continuation.take()) => page?,
            };

            cycle.record_page(page.objects.len());
            let next = page.next_continuation;
            let verdict = filter_page(page.objects, processed, &self.backfill, Utc::now());
            cycle.objects_too_old += verdict.too_old;

            for obj in verdict.candidates {
                debug!(entity = %self.entity, key = %obj.key, size = obj.size, "Forwarding object");

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Ok(CycleEnd::Cancelled),
                    sent = self.tx.send(obj) => {
                        if sent.is_err() {
                            return Ok(CycleEnd::DownstreamClosed);
                        }
                    }
                }

                cycle.objects_forwarded += 1;
                self.stats.record_forwarded();
            }

            if let Some(key) = verdict.stopped_at {
                info!(entity = %self.entity, object = %key, "Already processed, skipping");
                cycle.stopped_early = true;
                return Ok(CycleEnd::Completed);
            }

            match next {
                Some(token) => continuation = Some(token),
                None => return Ok(CycleEnd::Completed),
            }
        }
    }
}

/// Lookup failures are degraded per cycle, whatever their source.
fn into_oracle_error(e: LfError) -> LfError {
    match e {
        LfError::Oracle(_) => e,
        other => LfError::Oracle(other.to_string()),
    }
}
