//! Configuration types for the pipeline.

use lf_error::{LfError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default time between two listing cycles (5 minutes).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default maximum object age eligible for download (1 hour).
pub const DEFAULT_BACKFILL_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Default prefix of downloaded temporary files.
pub const DEFAULT_TEMP_FILE_PREFIX: &str = "logfetch-";

/// Configuration for one pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Time between the start of two listing cycles
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,

    /// Objects older than this are never downloaded
    #[serde(with = "duration_secs")]
    pub backfill_window: Duration,

    /// Capacity of the channel carrying downloaded records to the consumer
    pub output_buffer: usize,

    /// Directory for downloaded files (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,

    /// File name prefix for downloaded files
    pub temp_file_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            backfill_window: DEFAULT_BACKFILL_WINDOW,
            output_buffer: 1,
            temp_dir: None,
            temp_file_prefix: DEFAULT_TEMP_FILE_PREFIX.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the backfill window.
    pub fn with_backfill_window(mut self, window: Duration) -> Self {
        self.backfill_window = window;
        self
    }

    /// Set the output channel capacity.
    pub fn with_output_buffer(mut self, size: usize) -> Self {
        self.output_buffer = size;
        self
    }

    /// Set the directory downloaded files are written to.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Set the file name prefix of downloaded files.
    pub fn with_temp_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_file_prefix = prefix.into();
        self
    }

    /// Directory downloaded files end up in.
    pub fn download_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(LfError::Config(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.backfill_window.is_zero() {
            return Err(LfError::Config(
                "backfill_window must be greater than zero".to_string(),
            ));
        }
        if self.output_buffer == 0 {
            return Err(LfError::Config(
                "output_buffer must be at least 1".to_string(),
            ));
        }
        if self.temp_file_prefix.contains('/') {
            return Err(LfError::Config(
                "temp_file_prefix must not contain '/'".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serde helper storing a Duration as whole seconds.
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
