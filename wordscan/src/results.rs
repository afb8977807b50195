//! Result types for occurrence counting.
//!
//! A count of zero is ambiguous on its own: the word may be absent or the
//! file may have been unreadable. Every per-file entry therefore carries a
//! [`FileStatus`] next to its count, while `total` stays a plain sum.
use serde::Serialize;
use std::path::PathBuf;

/// How a file's contribution was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum FileStatus {
    /// Every worker for the file finished
    Complete,
    /// Some chunk workers failed; the count covers the rest
    Partial { failed_workers: usize },
    /// The file could not be opened or read
    Unreadable(String),
    /// The worker (thread or process) for the file never started
    LaunchFailed(String),
    /// A worker process ran but its result could not be read back
    ChannelFailed(String),
}

impl FileStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, FileStatus::Complete)
    }
}

/// Occurrences of the target word in a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCount {
    /// The path to the file
    pub path: PathBuf,
    /// Whole-word matches found
    pub occurrences: u64,
    pub status: FileStatus,
}

impl FileCount {
    pub fn complete(path: impl Into<PathBuf>, occurrences: u64) -> Self {
        Self {
            path: path.into(),
            occurrences,
            status: FileStatus::Complete,
        }
    }

    pub fn failed(path: impl Into<PathBuf>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            occurrences: 0,
            status,
        }
    }
}

/// Occurrence counts for a whole analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OccurrenceReport {
    /// The word that was counted
    pub word: String,
    /// Results per file, in submission order
    pub file_counts: Vec<FileCount>,
    /// Sum of all per-file occurrences
    pub total: u64,
    /// Files whose status is not complete
    pub files_with_errors: usize,
}

impl OccurrenceReport {
    /// Creates a new empty report for `word`
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Default::default()
        }
    }

    /// Adds a file count to the report
    pub fn add_file_count(&mut self, file_count: FileCount) {
        self.total += file_count.occurrences;
        if !file_count.status.is_complete() {
            self.files_with_errors += 1;
        }
        self.file_counts.push(file_count);
    }

    pub fn files_searched(&self) -> usize {
        self.file_counts.len()
    }
}
