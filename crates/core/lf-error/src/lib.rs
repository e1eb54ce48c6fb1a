//! Error types and classification for logfetch.
//!
//! This crate provides:
//! - [`LfError`] - Top-level error enum for all pipeline errors
//! - [`DownloadError`] for the per-object failures of the download stage
//! - [`ErrorCategory`] for deciding whether the pipeline keeps running
//! - Error classification based on error type and pipeline stage

use thiserror::Error;

/// Top-level error type for logfetch.
#[derive(Error, Debug)]
pub enum LfError {
    /// Listing or paging the bucket failed
    #[error("Listing error: {0}")]
    Listing(String),

    /// Fetching a single object failed
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// The processed-object oracle could not be queried
    #[error("Processed-object lookup failed: {0}")]
    Oracle(String),

    /// Account or region metadata could not be resolved
    #[error("Metadata resolution failed: {0}")]
    Metadata(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Download-stage errors.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The temporary file could not be created
    #[error("Error creating tmp file: {0}")]
    TempFile(String),

    /// The object request failed before any bytes arrived
    #[error("Error requesting object {key}: {message}")]
    Request { key: String, message: String },

    /// The body transfer failed part way
    #[error("Error downloading object {key}: {message}")]
    Transfer { key: String, message: String },

    /// Writing the body to local storage failed
    #[error("Error writing {path}: {message}")]
    Write { path: String, message: String },
}

/// Error classification for the pipeline's keep-going decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Log it and carry on with the next cycle or the next object.
    ///
    /// Examples: oracle unavailable, a single object failed to download
    Recoverable,

    /// Stop the stage and surface the error to the caller.
    ///
    /// Examples: bucket cannot be listed, account metadata missing
    Fatal,
}

/// Pipeline stage for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Building the entity descriptor at startup
    Startup,

    /// Fetching the processed-object set
    OracleLookup,

    /// Listing bucket pages
    Listing,

    /// Fetching an object into local storage
    Download,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Startup => write!(f, "Startup"),
            Self::OracleLookup => write!(f, "OracleLookup"),
            Self::Listing => write!(f, "Listing"),
            Self::Download => write!(f, "Download"),
        }
    }
}

/// Classifies an error to decide whether the pipeline continues.
///
/// # Arguments
///
/// * `error` - The error to classify
/// * `stage` - The pipeline stage where the error occurred
///
/// # Returns
///
/// The appropriate [`ErrorCategory`]
pub fn classify_error(error: &LfError, stage: PipelineStage) -> ErrorCategory {
    match error {
        LfError::Listing(_) => ErrorCategory::Fatal,
        LfError::Download(_) => ErrorCategory::Recoverable,
        LfError::Oracle(_) => ErrorCategory::Recoverable,
        LfError::Metadata(_) => ErrorCategory::Fatal,
        LfError::Config(_) => ErrorCategory::Fatal,
        LfError::Io(_) | LfError::Other(_) => classify_by_stage(stage),
    }
}

fn classify_by_stage(stage: PipelineStage) -> ErrorCategory {
    match stage {
        PipelineStage::Startup | PipelineStage::Listing => ErrorCategory::Fatal,
        PipelineStage::OracleLookup | PipelineStage::Download => ErrorCategory::Recoverable,
    }
}

impl LfError {
    /// Shorthand for [`classify_error`] returning whether the error is fatal.
    pub fn is_fatal(&self, stage: PipelineStage) -> bool {
        classify_error(self, stage) == ErrorCategory::Fatal
    }
}

/// Result type alias using LfError.
pub type Result<T> = std::result::Result<T, LfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_errors_are_fatal() {
        let error = LfError::Listing("AccessDenied".to_string());
        assert_eq!(
            classify_error(&error, PipelineStage::Listing),
            ErrorCategory::Fatal
        );
        assert!(error.is_fatal(PipelineStage::Listing));
    }

    #[test]
    fn test_oracle_errors_are_recoverable() {
        let error = LfError::Oracle("state file missing".to_string());
        assert_eq!(
            classify_error(&error, PipelineStage::OracleLookup),
            ErrorCategory::Recoverable
        );
    }

    #[test]
    fn test_download_errors_are_recoverable() {
        let error = LfError::Download(DownloadError::Transfer {
            key: "logs/a.gz".to_string(),
            message: "connection reset".to_string(),
        });
        assert!(!error.is_fatal(PipelineStage::Download));
    }

    #[test]
    fn test_metadata_errors_are_fatal() {
        let error = LfError::Metadata("no instance identity".to_string());
        assert!(error.is_fatal(PipelineStage::Startup));
    }

    #[test]
    fn test_io_error_follows_stage() {
        let io = || LfError::Io(std::io::Error::other("disk full"));
        assert_eq!(
            classify_error(&io(), PipelineStage::Download),
            ErrorCategory::Recoverable
        );
        assert_eq!(
            classify_error(&io(), PipelineStage::Startup),
            ErrorCategory::Fatal
        );
    }

    #[test]
    fn test_error_display() {
        let error = LfError::Download(DownloadError::TempFile("permission denied".to_string()));
        assert!(error.to_string().contains("Error creating tmp file"));

        let error = LfError::Download(DownloadError::Request {
            key: "cflogs/E1.2024-03-05.a.gz".to_string(),
            message: "NoSuchKey".to_string(),
        });
        assert!(error.to_string().contains("cflogs/E1.2024-03-05.a.gz"));
    }

    #[test]
    fn test_pipeline_stage_display() {
        assert_eq!(PipelineStage::Listing.to_string(), "Listing");
        assert_eq!(PipelineStage::OracleLookup.to_string(), "OracleLookup");
    }
}
