//! Occurrence counting with one child process per file.
//!
//! Each child scans a whole file in a single pass and reports its count as
//! a fixed-width little-endian `u64` on its own stdout pipe. The coordinator
//! spawns every child first, then reads the channels in submission order and
//! finally reaps every child.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

use crate::errors::{ScanError, ScanResult};
use crate::occurrence::{ChunkProcessor, WordMatcher};
use crate::results::{FileCount, FileStatus, OccurrenceReport};

/// Width in bytes of one encoded result
pub const RESULT_WIDTH: usize = std::mem::size_of::<u64>();

/// Hidden subcommand the coordinator passes to its own executable
pub const WORKER_SUBCOMMAND: &str = "scan-worker";

/// Writes one result to a worker's channel
pub fn write_count<W: Write>(writer: &mut W, count: u64) -> io::Result<()> {
    writer.write_all(&count.to_le_bytes())?;
    writer.flush()
}

/// Reads exactly one result from a worker's channel, blocking until it arrives
pub fn read_count<R: Read>(reader: &mut R) -> ScanResult<u64> {
    let mut buf = [0u8; RESULT_WIDTH];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            ScanError::channel_error("worker exited before reporting a result")
        }
        _ => ScanError::IoError(e),
    })?;
    Ok(u64::from_le_bytes(buf))
}

/// Body of a worker process: count `word` in `path` and report on `out`.
///
/// A file that cannot be read is reported as zero, matching what a thread
/// worker contributes for the same file.
pub fn run_worker<W: Write>(path: &Path, word: &str, out: &mut W) -> ScanResult<u64> {
    let processor = ChunkProcessor::new(WordMatcher::new(word)?);
    let count = match processor.process_whole_file(path) {
        Ok(count) => count,
        Err(e) => {
            warn!("Worker could not scan {}: {}", path.display(), e);
            0
        }
    };
    write_count(out, count)?;
    Ok(count)
}

/// Program and leading arguments used to start a worker.
///
/// The file path and the word are appended to `args` for each child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Re-invokes the running executable with the worker subcommand
    pub fn current_exe() -> ScanResult<Self> {
        Ok(Self::new(std::env::current_exe()?).arg(WORKER_SUBCOMMAND))
    }

    fn spawn(&self, path: &Path, word: &str) -> io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .arg(word)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
    }
}

/// Counts `word` in every file with one worker process per file
pub fn count_word_multiprocess(
    files: &[PathBuf],
    word: &str,
    worker: &WorkerCommand,
) -> ScanResult<OccurrenceReport> {
    info!("Counting '{}' in {} files with processes", word, files.len());

    if word.is_empty() {
        return Err(ScanError::EmptyWord);
    }
    if files.is_empty() {
        return Err(ScanError::NoFiles);
    }

    let mut children: Vec<Result<Child, String>> = files
        .iter()
        .map(|path| {
            worker.spawn(path, word).map_err(|e| {
                warn!("Failed to launch worker for {}: {}", path.display(), e);
                e.to_string()
            })
        })
        .collect();
    debug!(
        "Launched {} of {} worker processes",
        children.iter().filter(|c| c.is_ok()).count(),
        files.len()
    );

    let mut report = OccurrenceReport::new(word);
    for (path, child) in files.iter().zip(children.iter_mut()) {
        let file_count = match child {
            Ok(child) => match child.stdout.take() {
                // Dropping the pipe after one read closes our end of the channel.
                Some(mut channel) => match read_count(&mut channel) {
                    Ok(count) => FileCount::complete(path, count),
                    Err(e) => {
                        warn!("No result from worker for {}: {}", path.display(), e);
                        FileCount::failed(path, FileStatus::ChannelFailed(e.to_string()))
                    }
                },
                None => FileCount::failed(
                    path,
                    FileStatus::ChannelFailed("worker has no result channel".to_string()),
                ),
            },
            Err(msg) => FileCount::failed(path, FileStatus::LaunchFailed(msg.clone())),
        };
        report.add_file_count(file_count);
    }

    for (path, child) in files.iter().zip(children.iter_mut()) {
        if let Ok(child) = child {
            match child.wait() {
                Ok(status) if !status.success() => {
                    warn!("Worker for {} exited with {}", path.display(), status)
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to wait for worker of {}: {}", path.display(), e),
            }
        }
    }

    info!(
        "Count complete. Found {} occurrences in {} files ({} with errors)",
        report.total,
        report.files_searched(),
        report.files_with_errors
    );
    Ok(report)
}
