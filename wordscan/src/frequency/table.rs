use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Maximum number of distinct words a table tracks
pub const TABLE_CAPACITY: usize = 1000;

/// Longest token accepted, in bytes
pub const MAX_TOKEN_LEN: usize = 254;

/// Shortest token accepted, in bytes
pub const MIN_TOKEN_LEN: usize = 2;

/// A tracked word and how often it was seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub word: String,
    pub frequency: u32,
}

/// What a single submission did to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// An existing entry was incremented
    Incremented,
    /// A new entry was appended with frequency 1
    Inserted,
    /// The token's length is outside `MIN_TOKEN_LEN..=MAX_TOKEN_LEN`
    Rejected,
    /// The word is new but the table is full; it is dropped
    Saturated,
}

/// Capacity-bounded word table shared by all frequency workers of one run.
///
/// Lookup is a linear scan over at most [`TABLE_CAPACITY`] entries.
/// Lookup and insert happen under one lock acquisition, so two workers can
/// never both append the same new word.
#[derive(Debug)]
pub struct FrequencyTable {
    entries: Mutex<Vec<FrequencyEntry>>,
    capacity: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::with_capacity(TABLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FrequencyEntry>> {
        // Every mutation completes before the guard drops, so a poisoned table is still valid.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one occurrence of an already normalized word
    pub fn submit(&self, word: &str) -> Submission {
        if word.len() < MIN_TOKEN_LEN || word.len() > MAX_TOKEN_LEN {
            return Submission::Rejected;
        }

        let mut entries = self.lock();
        if let Some(entry) = entries.iter_mut().find(|e| e.word == word) {
            entry.frequency = entry.frequency.saturating_add(1);
            return Submission::Incremented;
        }
        if entries.len() >= self.capacity {
            return Submission::Saturated;
        }
        entries.push(FrequencyEntry {
            word: word.to_string(),
            frequency: 1,
        });
        Submission::Inserted
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn frequency(&self, word: &str) -> Option<u32> {
        self.lock()
            .iter()
            .find(|e| e.word == word)
            .map(|e| e.frequency)
    }

    /// Consumes the table, returning entries in insertion order
    pub fn into_entries(self) -> Vec<FrequencyEntry> {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
