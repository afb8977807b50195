use std::sync::{Mutex, PoisonError};

/// Occurrence total shared by the chunk workers of one file.
///
/// Workers call [`add`](Self::add) once each. The total is only read through
/// [`into_total`](Self::into_total), which needs ownership back, so it cannot
/// happen while any worker still borrows the counter.
#[derive(Debug, Default)]
pub struct OccurrenceCounter {
    total: Mutex<u64>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, count: u64) {
        // A poisoned lock still holds a consistent u64.
        let mut total = self.total.lock().unwrap_or_else(PoisonError::into_inner);
        *total += count;
    }

    pub fn into_total(self) -> u64 {
        self.total
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
