//! Main execution logic for the logfetch CLI.

use anyhow::{Context, Result};
use lf_pipeline::{
    ImdsMetadataResolver, MemoryProcessedObjects, Pipeline, PipelineConfig, S3Config,
    S3ObjectStore, StatsSnapshot, create_s3_client,
};
use lf_traits::{StaticMetadata, resolve_load_balancer};
use lf_types::{DownloadedObject, Entity};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::fmt;

use crate::args::{Cli, EntityCommand};

/// Initialize logging.
pub fn init_logging(level: crate::args::LogLevel) -> Result<()> {
    let level: Level = level.into();

    // stderr keeps stdout clean for records
    let subscriber = fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    subscriber.init();

    Ok(())
}

/// Outcome of a run.
#[derive(Debug)]
pub struct RunSummary {
    /// Records printed to stdout
    pub records: u64,

    /// Final pipeline counters
    pub stats: StatsSnapshot,
}

/// Build the entity descriptor from the chosen subcommand.
pub async fn build_entity(command: &EntityCommand) -> Result<Entity> {
    match command {
        EntityCommand::Lb(lb) => {
            let entity = match (&lb.account_id, &lb.log_region) {
                (Some(account_id), Some(region)) => {
                    let resolver = StaticMetadata::new(account_id, region);
                    resolve_load_balancer(&resolver, &lb.bucket, &lb.prefix_root, &lb.name).await
                }
                _ => {
                    let resolver = ImdsMetadataResolver::new();
                    resolve_load_balancer(&resolver, &lb.bucket, &lb.prefix_root, &lb.name).await
                }
            };
            entity.context("Failed to build load balancer descriptor")
        }
        EntityCommand::Cdn(cdn) => Ok(Entity::cdn(
            &cdn.bucket,
            &cdn.prefix_root,
            &cdn.distribution_id,
        )),
    }
}

/// Build the pipeline configuration from CLI arguments.
pub fn build_config(args: &Cli) -> PipelineConfig {
    let mut config = PipelineConfig::new()
        .with_poll_interval(Duration::from_secs(args.poll_interval_secs))
        .with_backfill_window(Duration::from_secs(args.backfill_secs));

    if let Some(dir) = &args.temp_dir {
        config = config.with_temp_dir(dir);
    }

    config
}

/// Execute the fetcher with the provided arguments.
pub async fn execute(args: Cli) -> Result<RunSummary> {
    let mut s3_config = S3Config::new().with_max_attempts(args.max_attempts);

    if let Some(region) = &args.region {
        s3_config = s3_config.with_region(region);
    }

    if let Some(endpoint) = &args.s3_endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        s3_config = s3_config.with_credentials(access_key, secret_key);
    }

    if let Some(profile) = &args.profile {
        s3_config = s3_config.with_profile(profile);
    }

    let client = create_s3_client(&s3_config)
        .await
        .context("Failed to create S3 client")?;
    let store = Arc::new(S3ObjectStore::new(client));

    let entity = build_entity(&args.entity).await?;
    let oracle = Arc::new(MemoryProcessedObjects::new());
    let config = build_config(&args);

    let pipeline = Pipeline::new(store, oracle.clone(), entity, config)
        .context("Invalid pipeline configuration")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let mut handle = pipeline.start(cancel.clone());
    let mut records: u64 = 0;

    while let Some(record) = handle.recv().await {
        print_record(&record)?;
        oracle.mark_processed(record.key.clone());
        records += 1;

        if args.delete_after {
            if let Err(e) = tokio::fs::remove_file(&record.path).await {
                warn!(file = %record.path.display(), error = %e, "Failed to delete downloaded file");
            }
        }

        if args.max_records > 0 && records >= args.max_records {
            info!(records, "Record limit reached, stopping");
            handle.shutdown();
            break;
        }
    }

    let stats = handle.join().await.context("Pipeline stopped with an error")?;

    Ok(RunSummary { records, stats })
}

/// Write one record as a JSON line to stdout.
fn print_record(record: &DownloadedObject) -> Result<()> {
    let line = serde_json::to_string(record).context("Failed to serialize record")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line).context("Failed to write to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// Cancel `cancel` on Ctrl+C.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            () = cancel.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received Ctrl+C, initiating shutdown"),
                    Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
                }
                cancel.cancel();
            }
        }
    });
}
