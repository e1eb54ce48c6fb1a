//! Pipeline assembly: wires the lister and downloader for one entity.

use crate::config::PipelineConfig;
use crate::downloader::Downloader;
use crate::filter::BackfillFilter;
use crate::lister::Lister;
use crate::stats::{PipelineStats, StatsSnapshot};
use lf_error::{LfError, Result};
use lf_traits::{ObjectStore, ProcessedObjects};
use lf_types::{DownloadedObject, Entity};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A configured, not yet running pipeline for one entity.
///
/// Call [`start`](Pipeline::start) to spawn both stages. Starting consumes
/// the pipeline, so a configured instance runs at most once.
pub struct Pipeline<S: ObjectStore, O: ProcessedObjects> {
    store: Arc<S>,
    oracle: Arc<O>,
    entity: Arc<Entity>,
    config: PipelineConfig,
    backfill: BackfillFilter,
    stats: Arc<PipelineStats>,
}

impl<S, O> Pipeline<S, O>
where
    S: ObjectStore + 'static,
    O: ProcessedObjects + 'static,
{
    /// Create a pipeline after validating its configuration.
    pub fn new(store: Arc<S>, oracle: Arc<O>, entity: Entity, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let backfill = BackfillFilter::from_std(config.backfill_window)?;

        Ok(Self {
            store,
            oracle,
            entity: Arc::new(entity),
            config,
            backfill,
            stats: Arc::new(PipelineStats::new()),
        })
    }

    /// Spawn the lister and downloader and return the consumer side.
    ///
    /// Both stages stop when `cancel` fires or when the consumer side is
    /// gone: dropping the receiver, or calling
    /// [`join`](PipelineHandle::join), stops even an idle pipeline.
    pub fn start(self, cancel: CancellationToken) -> PipelineHandle {
        info!(
            entity = %self.entity,
            kind = %self.entity.kind(),
            bucket = self.entity.bucket(),
            poll_interval_secs = self.config.poll_interval.as_secs(),
            backfill_secs = self.config.backfill_window.as_secs(),
            "Starting pipeline"
        );

        // Capacity 1: the lister runs at most one object ahead of the downloader.
        let (handoff_tx, handoff_rx) = mpsc::channel(1);
        let (output_tx, output_rx) = mpsc::channel(self.config.output_buffer);

        let lister = Lister::new(
            self.store.clone(),
            self.oracle,
            self.entity.clone(),
            self.backfill,
            self.config.poll_interval,
            handoff_tx,
            self.stats.clone(),
        );
        let downloader = Downloader::new(
            self.store,
            self.entity.clone(),
            handoff_rx,
            output_tx,
            self.config.download_dir(),
            self.config.temp_file_prefix,
            self.stats.clone(),
        );

        let lister = tokio::spawn(lister.run(cancel.child_token()));
        let downloader = tokio::spawn(downloader.run(cancel.child_token()));

        PipelineHandle {
            entity: self.entity,
            rx: output_rx,
            cancel,
            lister,
            downloader,
            stats: self.stats,
        }
    }
}

/// Consumer side of a running pipeline.
pub struct PipelineHandle {
    entity: Arc<Entity>,
    rx: mpsc::Receiver<DownloadedObject>,
    cancel: CancellationToken,
    lister: JoinHandle<Result<()>>,
    downloader: JoinHandle<Result<()>>,
    stats: Arc<PipelineStats>,
}

impl PipelineHandle {
    /// Receive the next downloaded object.
    ///
    /// Returns `None` once both stages have stopped. Use
    /// [`join`](PipelineHandle::join) afterwards to learn why.
    pub async fn recv(&mut self) -> Option<DownloadedObject> {
        self.rx.recv().await
    }

    /// Detach both stages and keep only the output channel.
    ///
    /// The stages keep running until the token is cancelled or the returned
    /// receiver is dropped. A fatal stage error is still logged but can no
    /// longer be observed through [`join`](PipelineHandle::join).
    pub fn into_receiver(self) -> mpsc::Receiver<DownloadedObject> {
        self.rx
    }

    /// The entity this pipeline fetches logs for.
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Token that stops both stages when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request both stages to stop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Take a point-in-time copy of the pipeline counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop consuming and wait for both stages to finish.
    ///
    /// Closing the output channel stops the downloader, which in turn stops
    /// the lister, so this returns without [`shutdown`](PipelineHandle::shutdown)
    /// even when the bucket is idle. Pending records still in the output
    /// channel are dropped along with their files.
    ///
    /// Returns the counters taken after both stages stopped, or the fatal
    /// error that ended the pipeline. A listing error wins over a download
    /// error.
    pub async fn join(mut self) -> Result<StatsSnapshot> {
        self.rx.close();
        while let Some(record) = self.rx.recv().await {
            if let Err(e) = tokio::fs::remove_file(&record.path).await {
                error!(file = %record.path.display(), error = %e, "Failed to remove undelivered file");
            }
        }

        let downloader = self
            .downloader
            .await
            .map_err(|e| LfError::Other(anyhow::Error::new(e)))?;
        let lister = self.lister.await.map_err(|e| LfError::Other(anyhow::Error::new(e)))?;

        let snapshot = self.stats.snapshot();
        info!(
            entity = %self.entity,
            cycles = snapshot.cycles,
            forwarded = snapshot.objects_forwarded,
            downloaded = snapshot.downloads_succeeded,
            failed = snapshot.downloads_failed,
            bytes = snapshot.bytes_downloaded,
            "Pipeline stopped"
        );

        lister?;
        downloader?;
        Ok(snapshot)
    }
}
