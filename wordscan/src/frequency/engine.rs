use std::fs::File;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{info, warn};

use super::report::{FileScan, FrequencyReport};
use super::scanner::TokenScanner;
use super::table::FrequencyTable;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::results::FileStatus;
use crate::scheduler::{BatchScheduler, WorkerOutcome};

/// Builds a word-frequency table over `files`, one worker thread per file
pub fn count_frequencies(
    files: &[PathBuf],
    max_concurrency: NonZeroUsize,
) -> ScanResult<FrequencyReport> {
    count_frequencies_into(files, max_concurrency, FrequencyTable::new())
}

/// Like [`count_frequencies`] but fills a caller-provided table
pub fn count_frequencies_into(
    files: &[PathBuf],
    max_concurrency: NonZeroUsize,
    table: FrequencyTable,
) -> ScanResult<FrequencyReport> {
    info!("Counting word frequencies in {} files", files.len());

    if files.is_empty() {
        return Err(ScanError::NoFiles);
    }

    let metrics = ScanMetrics::new();
    let scanner = TokenScanner::new(metrics.clone());
    let scheduler = BatchScheduler::with_metrics(max_concurrency, "frequency", metrics.clone());

    let outcomes = scheduler.run(files, |_, path| {
        let file = File::open(path).map_err(|e| ScanError::from_open(path, e))?;
        scanner.scan(file, &table)
    });

    let scans = files
        .iter()
        .zip(outcomes)
        .map(|(path, outcome)| {
            let (tokens, status) = match outcome {
                WorkerOutcome::Completed(Ok(tokens)) => (tokens, FileStatus::Complete),
                WorkerOutcome::Completed(Err(e)) => {
                    warn!("Frequency worker for {} failed: {}", path.display(), e);
                    (0, FileStatus::Unreadable(e.to_string()))
                }
                WorkerOutcome::LaunchFailed(msg) => (0, FileStatus::LaunchFailed(msg)),
                WorkerOutcome::Panicked => (
                    0,
                    FileStatus::LaunchFailed("worker panicked".to_string()),
                ),
            };
            FileScan {
                path: path.clone(),
                tokens,
                status,
            }
        })
        .collect();

    let report = FrequencyReport::new(table.into_entries(), scans);

    metrics.log_stats();
    info!(
        "Frequency count complete. Tracked {} distinct words ({} files with errors)",
        report.entries.len(),
        report.files_with_errors()
    );
    Ok(report)
}
