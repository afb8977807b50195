use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::ops::Deref;
use std::path::Path;
use tracing::{trace, warn};

use super::matcher::WordMatcher;
use crate::chunk::ChunkSpec;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;

// Constants for whole-file loading
const BUFFER_CAPACITY: usize = 65536;
pub(crate) const SMALL_FILE_THRESHOLD: u64 = 32 * 1024; // 32KB
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// File contents held either in memory or through a read-only mapping
pub enum FileBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Owned(bytes) => bytes,
            FileBytes::Mapped(mmap) => mmap,
        }
    }
}

fn open(path: &Path) -> ScanResult<File> {
    File::open(path).map_err(|e| ScanError::from_open(path, e))
}

/// Runs the occurrence scan for chunks and whole files
#[derive(Debug, Clone)]
pub struct ChunkProcessor {
    matcher: WordMatcher,
    metrics: ScanMetrics,
}

impl ChunkProcessor {
    /// Creates a new ChunkProcessor with the given matcher
    pub fn new(matcher: WordMatcher) -> Self {
        Self::with_metrics(matcher, ScanMetrics::new())
    }

    pub fn with_metrics(matcher: WordMatcher, metrics: ScanMetrics) -> Self {
        Self { matcher, metrics }
    }

    pub fn matcher(&self) -> &WordMatcher {
        &self.matcher
    }

    /// Reads the chunk's read window and counts matches in its counting window
    pub fn process_chunk(&self, path: &Path, chunk: &ChunkSpec, file_size: u64) -> ScanResult<u64> {
        let mut file = open(path)?;
        file.seek(SeekFrom::Start(chunk.read.start))?;

        let wanted = chunk.read.len();
        let mut buf = Vec::with_capacity(wanted as usize);
        file.take(wanted).read_to_end(&mut buf)?;
        self.metrics.record_bytes_read(buf.len() as u64);

        if (buf.len() as u64) < wanted {
            // The file shrank after it was planned; the edge is wherever reading stopped.
            warn!(
                "Short read on {}: wanted {} bytes at {}, got {}",
                path.display(),
                wanted,
                chunk.read.start,
                buf.len()
            );
        }

        let at_file_start = chunk.read.start == 0;
        let at_file_end = chunk.read.end == file_size || (buf.len() as u64) < wanted;
        let count = self
            .matcher
            .count_in_window(&buf, chunk.count_window(), at_file_start, at_file_end);

        trace!(
            "Chunk {}..{} of {}: {} matches",
            chunk.count.start,
            chunk.count.end,
            path.display(),
            count
        );
        self.metrics.record_chunk();
        Ok(count)
    }

    /// Loads the whole file, picking a read strategy by size
    pub fn load_file(&self, path: &Path) -> ScanResult<FileBytes> {
        let mut file = open(path)?;
        let size = match file.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("Failed to get metadata for {}: {}", path.display(), e);
                SMALL_FILE_THRESHOLD
            }
        };

        let bytes = if size < SMALL_FILE_THRESHOLD {
            trace!("Reading {} directly", path.display());
            let mut bytes = Vec::with_capacity(size as usize);
            file.read_to_end(&mut bytes)?;
            FileBytes::Owned(bytes)
        } else if size >= LARGE_FILE_THRESHOLD {
            trace!("Memory mapping {}", path.display());
            let mmap = unsafe { Mmap::map(&file) }?;
            FileBytes::Mapped(mmap)
        } else {
            trace!("Reading {} through a buffered reader", path.display());
            let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
            let mut bytes = Vec::with_capacity(size as usize);
            reader.read_to_end(&mut bytes)?;
            FileBytes::Owned(bytes)
        };

        self.metrics.record_bytes_read(bytes.len() as u64);
        Ok(bytes)
    }

    /// Counts matches over the whole file in a single pass
    pub fn process_whole_file(&self, path: &Path) -> ScanResult<u64> {
        let bytes = self.load_file(path)?;
        Ok(self.matcher.count_all(&bytes))
    }
}
