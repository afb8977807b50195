use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::counter::OccurrenceCounter;
use super::matcher::WordMatcher;
use super::processor::ChunkProcessor;
use crate::chunk::ChunkPlan;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::results::{FileCount, FileStatus, OccurrenceReport};
use crate::scheduler::{BatchScheduler, WorkerOutcome};

/// Counts `word` in every file, one file at a time, each split across chunk workers
pub fn count_word_in_files(
    files: &[PathBuf],
    word: &str,
    worker_count: usize,
    max_concurrency: NonZeroUsize,
) -> ScanResult<OccurrenceReport> {
    info!("Counting '{}' in {} files with threads", word, files.len());

    let matcher = WordMatcher::new(word)?;
    if files.is_empty() {
        return Err(ScanError::NoFiles);
    }

    let metrics = ScanMetrics::new();
    let processor = ChunkProcessor::with_metrics(matcher, metrics.clone());
    let scheduler = BatchScheduler::with_metrics(max_concurrency, "chunk", metrics.clone());

    let mut report = OccurrenceReport::new(word);
    for path in files {
        let file_count = count_word_in_file(path, &processor, worker_count, &scheduler)?;
        debug!(
            "{}: {} occurrences ({:?})",
            path.display(),
            file_count.occurrences,
            file_count.status
        );
        report.add_file_count(file_count);
    }

    metrics.log_stats();
    info!(
        "Count complete. Found {} occurrences in {} files ({} with errors)",
        report.total,
        report.files_searched(),
        report.files_with_errors
    );

    Ok(report)
}

/// Counts the processor's word in one file using a fresh shared counter
pub fn count_word_in_file(
    path: &Path,
    processor: &ChunkProcessor,
    worker_count: usize,
    scheduler: &BatchScheduler,
) -> ScanResult<FileCount> {
    let file_size = match path.metadata() {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            let err = ScanError::from_open(path, e);
            warn!("Skipping {}: {}", path.display(), err);
            return Ok(FileCount::failed(
                path,
                FileStatus::Unreadable(err.to_string()),
            ));
        }
    };

    let plan = ChunkPlan::new(file_size, worker_count, processor.matcher().word_len())?;
    if plan.is_empty() {
        return Ok(FileCount::complete(path, 0));
    }

    let counter = OccurrenceCounter::new();
    let outcomes = scheduler.run(plan.chunks(), |_, chunk| {
        processor
            .process_chunk(path, chunk, file_size)
            .map(|count| counter.add(count))
    });

    let status = chunk_status(path, outcomes);
    Ok(FileCount {
        path: path.to_path_buf(),
        occurrences: counter.into_total(),
        status,
    })
}

fn chunk_status(path: &Path, outcomes: Vec<WorkerOutcome<ScanResult<()>>>) -> FileStatus {
    let total = outcomes.len();
    let mut first_error = None;
    let mut launch_error = None;
    let mut failed = 0;

    for outcome in outcomes {
        match outcome {
            WorkerOutcome::Completed(Ok(())) => {}
            WorkerOutcome::Completed(Err(e)) => {
                warn!("Chunk worker for {} failed: {}", path.display(), e);
                failed += 1;
                first_error.get_or_insert_with(|| e.to_string());
            }
            WorkerOutcome::LaunchFailed(msg) => {
                failed += 1;
                launch_error.get_or_insert(msg);
            }
            WorkerOutcome::Panicked => {
                failed += 1;
                launch_error.get_or_insert_with(|| "worker panicked".to_string());
            }
        }
    }

    match (failed, first_error, launch_error) {
        (0, _, _) => FileStatus::Complete,
        (n, Some(err), _) if n == total => FileStatus::Unreadable(err),
        (n, None, Some(msg)) if n == total => FileStatus::LaunchFailed(msg),
        (n, _, _) => FileStatus::Partial { failed_workers: n },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn threads(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_count_across_files() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        std::fs::write(&first, "the cat sat on the mat\n".repeat(50)).unwrap();
        std::fs::write(&second, "There is the thesis; the end").unwrap();

        let report = count_word_in_files(&[first, second], "the", 8, threads(4)).unwrap();
        assert_eq!(report.file_counts[0].occurrences, 100);
        assert_eq!(report.file_counts[1].occurrences, 2);
        assert_eq!(report.total, 102);
        assert_eq!(report.files_with_errors, 0);
    }

    #[test]
    fn test_missing_file_contributes_zero() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present");
        std::fs::write(&present, "word word").unwrap();
        let missing = dir.path().join("missing");

        let report =
            count_word_in_files(&[missing, present], "word", 8, threads(8)).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.files_with_errors, 1);
        assert!(matches!(
            report.file_counts[0].status,
            FileStatus::Unreadable(_)
        ));
        assert!(report.file_counts[1].status.is_complete());
    }

    #[test]
    fn test_empty_file_launches_no_workers() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty");
        std::fs::write(&empty, "").unwrap();

        let metrics = ScanMetrics::new();
        let processor =
            ChunkProcessor::with_metrics(WordMatcher::new("x").unwrap(), metrics.clone());
        let scheduler = BatchScheduler::with_metrics(threads(8), "chunk", metrics.clone());

        let file_count = count_word_in_file(&empty, &processor, 8, &scheduler).unwrap();
        assert_eq!(file_count, FileCount::complete(&empty, 0));
        assert_eq!(metrics.get_stats().workers_launched, 0);
    }

    #[test]
    fn test_degenerate_input_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "text").unwrap();

        assert!(matches!(
            count_word_in_files(&[file], "", 8, threads(8)),
            Err(ScanError::EmptyWord)
        ));
        assert!(matches!(
            count_word_in_files(&[], "text", 8, threads(8)),
            Err(ScanError::NoFiles)
        ));
    }

    #[test]
    fn test_chunk_status() {
        let path = Path::new("bib");
        assert_eq!(
            chunk_status(path, vec![WorkerOutcome::Completed(Ok(()))]),
            FileStatus::Complete
        );
        assert_eq!(
            chunk_status(
                path,
                vec![
                    WorkerOutcome::Completed(Ok(())),
                    WorkerOutcome::LaunchFailed("again".to_string()),
                ]
            ),
            FileStatus::Partial { failed_workers: 1 }
        );
        assert_eq!(
            chunk_status(
                path,
                vec![
                    WorkerOutcome::Completed(Err(ScanError::file_not_found(path))),
                    WorkerOutcome::Panicked,
                ]
            ),
            FileStatus::Unreadable("File not found: bib".to_string())
        );
        assert_eq!(
            chunk_status(path, vec![WorkerOutcome::Panicked]),
            FileStatus::LaunchFailed("worker panicked".to_string())
        );
    }
}
