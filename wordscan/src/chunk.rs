use serde::Serialize;
use std::ops::Range;
use tracing::debug;

use crate::errors::{ScanError, ScanResult};

/// Upper bound on the number of chunks a single file is split into
pub const MAX_WORKERS: usize = 8;

/// Half-open byte range `[start, end)` within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Work assignment for one chunk worker.
///
/// `read` is what the worker loads from disk; `count` is the exclusive window
/// in which a match must start to be tallied. `read` extends `count` by the
/// overlap on every side that is not a file edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkSpec {
    pub read: ByteRange,
    pub count: ByteRange,
}

impl ChunkSpec {
    /// The counting window expressed as offsets into the read buffer
    pub fn count_window(&self) -> Range<usize> {
        let start = (self.count.start - self.read.start) as usize;
        let end = (self.count.end - self.read.start) as usize;
        start..end
    }
}

/// Ordered chunk assignments covering one file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChunkPlan {
    chunks: Vec<ChunkSpec>,
}

impl ChunkPlan {
    /// Splits `file_size` bytes into at most [`MAX_WORKERS`] chunks.
    ///
    /// Counting windows partition `[0, file_size)`; the last one absorbs the
    /// division remainder. Read windows are widened by `2 * word_len` at
    /// internal boundaries so a word crossing a boundary is fully visible to
    /// the chunk whose counting window holds its first byte.
    pub fn new(file_size: u64, worker_count: usize, word_len: usize) -> ScanResult<Self> {
        if word_len == 0 {
            return Err(ScanError::EmptyWord);
        }
        let overlap = 2 * word_len as u64;
        if file_size == 0 {
            return Ok(Self { chunks: Vec::new() });
        }

        let workers = worker_count.clamp(1, MAX_WORKERS) as u64;
        let base = file_size / workers;
        let chunks = (0..workers)
            .map(|i| {
                let count_start = i * base;
                let count_end = if i == workers - 1 {
                    file_size
                } else {
                    (i + 1) * base
                };
                ChunkSpec {
                    read: ByteRange::new(
                        count_start.saturating_sub(overlap),
                        (count_end + overlap).min(file_size),
                    ),
                    count: ByteRange::new(count_start, count_end),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Planned {} chunks for {} bytes (base {}, overlap {})",
            chunks.len(),
            file_size,
            base,
            overlap
        );

        Ok(Self { chunks })
    }

    pub fn chunks(&self) -> &[ChunkSpec] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
