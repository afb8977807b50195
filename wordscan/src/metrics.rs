use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Tracks work done by the workers of one analysis
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    // I/O metrics
    bytes_read: Arc<AtomicU64>,
    chunks_scanned: Arc<AtomicU64>,

    // Worker metrics
    workers_launched: Arc<AtomicU64>,
    worker_failures: Arc<AtomicU64>,

    // Frequency table metrics
    tokens_submitted: Arc<AtomicU64>,
    tokens_rejected: Arc<AtomicU64>,
    tokens_saturated: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Self {
            bytes_read: Arc::new(AtomicU64::new(0)),
            chunks_scanned: Arc::new(AtomicU64::new(0)),
            workers_launched: Arc::new(AtomicU64::new(0)),
            worker_failures: Arc::new(AtomicU64::new(0)),
            tokens_submitted: Arc::new(AtomicU64::new(0)),
            tokens_rejected: Arc::new(AtomicU64::new(0)),
            tokens_saturated: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_bytes_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_chunk(&self) {
        self.chunks_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_launch(&self) {
        self.workers_launched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_worker_failure(&self) {
        self.worker_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a token handed to the frequency table and what became of it
    pub fn record_token(&self, outcome: TokenOutcome) {
        self.tokens_submitted.fetch_add(1, Ordering::Relaxed);
        match outcome {
            TokenOutcome::Tracked => {}
            TokenOutcome::Rejected => {
                self.tokens_rejected.fetch_add(1, Ordering::Relaxed);
            }
            TokenOutcome::Saturated => {
                self.tokens_saturated.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Gets a snapshot of the counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            chunks_scanned: self.chunks_scanned.load(Ordering::Relaxed),
            workers_launched: self.workers_launched.load(Ordering::Relaxed),
            worker_failures: self.worker_failures.load(Ordering::Relaxed),
            tokens_submitted: self.tokens_submitted.load(Ordering::Relaxed),
            tokens_rejected: self.tokens_rejected.load(Ordering::Relaxed),
            tokens_saturated: self.tokens_saturated.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Bytes read: {}\n\
             Chunks scanned: {}\n\
             Workers launched/failed: {}/{}\n\
             Tokens submitted/rejected/dropped: {}/{}/{}",
            stats.bytes_read,
            stats.chunks_scanned,
            stats.workers_launched,
            stats.worker_failures,
            stats.tokens_submitted,
            stats.tokens_rejected,
            stats.tokens_saturated
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Coarse result of one frequency-table submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOutcome {
    Tracked,
    Rejected,
    Saturated,
}

/// Snapshot of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub bytes_read: u64,
    pub chunks_scanned: u64,
    pub workers_launched: u64,
    pub worker_failures: u64,
    pub tokens_submitted: u64,
    pub tokens_rejected: u64,
    pub tokens_saturated: u64,
}
