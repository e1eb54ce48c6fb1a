//! CLI argument definitions for logfetch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Access log fetcher for load balancers and CDN distributions.
///
/// Polls the log bucket of one entity, downloads new log objects into local
/// files and prints one JSON object per downloaded file to stdout.
///
/// ## Examples
///
/// Load balancer, account and region from instance metadata:
///   logfetch lb -b my-logs --prefix-root elb --name app.my-lb.1234567890abcdef
///
/// Load balancer with explicit account and region:
///   logfetch lb -b my-logs --prefix-root elb --name app.my-lb.1234567890abcdef \
///       --account-id 123456789012 --log-region eu-west-1
///
/// CDN distribution, deleting each file after it was printed:
///   logfetch --delete-after cdn -b cf-logs --prefix-root cflogs \
///       --distribution-id EDFDVBD6EXAMPLE
#[derive(Parser, Debug)]
#[command(name = "logfetch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub entity: EntityCommand,

    // === S3 Configuration ===
    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, global = true, env = "LF_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region of the log bucket
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS access key ID
    #[arg(long, global = true, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, global = true, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Attempts per S3 request, including the first (must be >= 1)
    #[arg(long, global = true, default_value = "3", value_parser = parse_positive_u32)]
    pub max_attempts: u32,

    // === Pipeline Options ===
    /// Seconds between two listing cycles (must be >= 1)
    #[arg(long, global = true, env = "LF_POLL_INTERVAL_SECS", default_value = "300", value_parser = parse_positive_u64)]
    pub poll_interval_secs: u64,

    /// Maximum age in seconds of objects to download (must be >= 1)
    #[arg(long, global = true, env = "LF_BACKFILL_SECS", default_value = "3600", value_parser = parse_positive_u64)]
    pub backfill_secs: u64,

    /// Directory for downloaded files (system temp dir when unset)
    #[arg(long, global = true, env = "LF_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Delete each downloaded file once its record was printed
    #[arg(long, global = true)]
    pub delete_after: bool,

    /// Stop after this many downloaded files (0 = run until interrupted)
    #[arg(long, global = true, default_value = "0")]
    pub max_records: u64,

    // === Logging Options ===
    /// Log level
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Entity whose logs are fetched.
#[derive(Subcommand, Debug)]
pub enum EntityCommand {
    /// Fetch load balancer access logs
    Lb(LoadBalancerArgs),

    /// Fetch CDN distribution access logs
    Cdn(CdnArgs),
}

/// Load balancer entity arguments.
#[derive(Args, Debug)]
pub struct LoadBalancerArgs {
    /// Bucket the load balancer delivers its logs to
    #[arg(short, long, env = "LF_BUCKET")]
    pub bucket: String,

    /// Prefix configured on the load balancer's log delivery
    #[arg(long, env = "LF_PREFIX_ROOT")]
    pub prefix_root: String,

    /// Load balancer name as it appears in log file names
    #[arg(long, env = "LF_LB_NAME")]
    pub name: String,

    /// Account id in log keys (instance metadata when unset)
    #[arg(long, env = "LF_ACCOUNT_ID", requires = "log_region")]
    pub account_id: Option<String>,

    /// Region in log keys (instance metadata when unset)
    #[arg(long, env = "LF_LOG_REGION", requires = "account_id")]
    pub log_region: Option<String>,
}

/// CDN entity arguments.
#[derive(Args, Debug)]
pub struct CdnArgs {
    /// Bucket the distribution delivers its logs to
    #[arg(short, long, env = "LF_BUCKET")]
    pub bucket: String,

    /// Prefix configured on the distribution's log delivery
    #[arg(long, env = "LF_PREFIX_ROOT")]
    pub prefix_root: String,

    /// Distribution id
    #[arg(long, env = "LF_DISTRIBUTION_ID")]
    pub distribution_id: String,
}

/// Log level argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Parse a positive u64 (>= 1).
fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}

/// Parse a positive u32 (>= 1).
fn parse_positive_u32(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}
