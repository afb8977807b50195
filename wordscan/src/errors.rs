//! Error types for wordscan.
//!
//! Only failures that abort a whole analysis surface as `Err`. A file that
//! cannot be opened or a worker that cannot be launched is absorbed into a zero
//! contribution and reported through [`crate::results::FileStatus`] instead, so
//! callers always receive a final aggregate:
//! ```rust,ignore
//! match count_word_in_files(&files, "the", 8, max_concurrency) {
//!     Ok(report) => println!("{}", report.total),
//!     Err(ScanError::EmptyWord) => eprintln!("nothing to search for"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur during an analysis
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Target word must not be empty")]
    EmptyWord,
    #[error("No input files to analyze")]
    NoFiles,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Result channel error: {0}")]
    ChannelError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScanError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn channel_error(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }

    /// Classifies an I/O error raised while opening `path`
    pub fn from_open(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::file_not_found(path),
            io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
