//! Download stage: fetch each forwarded object into a local file.

use crate::stats::PipelineStats;
use chrono::Utc;
use futures::StreamExt;
use lf_error::{DownloadError, ErrorCategory, PipelineStage, Result, classify_error};
use lf_traits::ObjectStore;
use lf_types::{DownloadedObject, Entity, ObjectRef};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Fetches objects one at a time, in the order the lister forwarded them.
///
/// Every object is written to a fresh uniquely-named file. A recoverable
/// failure is logged and the object dropped; the next one is processed
/// normally. A fatal one stops the stage. Files of delivered records are
/// left in place for the consumer.
pub struct Downloader<S: ObjectStore> {
    store: Arc<S>,
    entity: Arc<Entity>,
    rx: mpsc::Receiver<ObjectRef>,
    tx: mpsc::Sender<DownloadedObject>,
    download_dir: PathBuf,
    file_prefix: String,
    stats: Arc<PipelineStats>,
}

impl<S: ObjectStore> Downloader<S> {
    /// Create a downloader reading from `rx` and delivering into `tx`.
    pub fn new(
        store: Arc<S>,
        entity: Arc<Entity>,
        rx: mpsc::Receiver<ObjectRef>,
        tx: mpsc::Sender<DownloadedObject>,
        download_dir: PathBuf,
        file_prefix: impl Into<String>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            store,
            entity,
            rx,
            tx,
            download_dir,
            file_prefix: file_prefix.into(),
            stats,
        }
    }

    /// Process objects until the lister is gone, the consumer is gone,
    /// cancellation is requested, or a fatal error occurs.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        loop {
            let obj = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = self.tx.closed() => {
                    debug!(entity = %self.entity, "Consumer gone, stopping downloader");
                    break;
                }
                next = self.rx.recv() => match next {
                    Some(obj) => obj,
                    None => {
                        debug!(entity = %self.entity, "Lister finished, stopping downloader");
                        break;
                    }
                },
            };

            // Dropping an unfinished download removes its partial file.
            let fetched = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                fetched = self.download_object(&obj) => fetched,
            };

            let record = match fetched {
                Ok(record) => record,
                Err(e) => {
                    self.stats.record_download_failure();
                    error!(
                        entity = %self.entity,
                        bucket = self.entity.bucket(),
                        key = %obj.key,
                        error = %e,
                        "Failed to download object"
                    );
                    match classify_error(&e, PipelineStage::Download) {
                        ErrorCategory::Recoverable => continue,
                        ErrorCategory::Fatal => return Err(e),
                    }
                }
            };

            self.stats.record_download(record.bytes);
            let path = record.path.clone();

            let delivered = tokio::select! {
                biased;
                () = cancel.cancelled() => false,
                sent = self.tx.send(record) => sent.is_ok(),
            };

            if !delivered {
                // Nobody took ownership of the file.
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    debug!(file = %path.display(), error = %e, "Failed to remove undelivered file");
                }
                debug!(entity = %self.entity, "Consumer gone or cancelled, stopping downloader");
                break;
            }
        }

        Ok(())
    }

    /// Fetch one object into a new temporary file.
    pub async fn download_object(&self, obj: &ObjectRef) -> Result<DownloadedObject> {
        info!(
            key = %obj.key,
            size = obj.size,
            from_time_ago_secs = obj.age(Utc::now()).num_seconds(),
            entity = %self.entity,
            "Downloading access logs from object"
        );

        let (temp, handle) = self.create_temp_file().await?;
        let temp_path = temp.path().display().to_string();
        let mut file = tokio::fs::File::from_std(handle);

        let mut body = self.store.get_object(self.entity.bucket(), &obj.key).await?;
        let mut bytes: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::Write {
                    path: temp_path.clone(),
                    message: e.to_string(),
                })?;
            bytes += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| DownloadError::Write {
            path: temp_path.clone(),
            message: e.to_string(),
        })?;
        drop(file);

        let (_, path) = temp.keep().map_err(|e| DownloadError::Write {
            path: temp_path,
            message: e.error.to_string(),
        })?;

        info!(
            bytes,
            file = %path.display(),
            entity = %self.entity,
            "Successfully downloaded object"
        );

        Ok(DownloadedObject {
            path,
            key: obj.key.clone(),
            bytes,
        })
    }

    /// Create the destination file off the async workers.
    ///
    /// The returned handle writes to the same file; dropping the
    /// `NamedTempFile` without keeping it deletes the file.
    async fn create_temp_file(&self) -> Result<(tempfile::NamedTempFile, std::fs::File)> {
        let dir = self.download_dir.clone();
        let prefix = self.file_prefix.clone();

        let created = tokio::task::spawn_blocking(move || {
            let temp = tempfile::Builder::new().prefix(&prefix).tempfile_in(&dir)?;
            let handle = temp.as_file().try_clone()?;
            Ok::<_, std::io::Error>((temp, handle))
        })
        .await
        .map_err(|e| DownloadError::TempFile(e.to_string()))?
        .map_err(|e| DownloadError::TempFile(e.to_string()))?;

        Ok(created)
    }
}
