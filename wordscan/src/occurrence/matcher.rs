use memchr::memmem::Finder;
use std::ops::Range;

use crate::errors::{ScanError, ScanResult};
use crate::tokenizer::is_word_byte;

/// Whole-word matcher for a single target word
#[derive(Debug, Clone)]
pub struct WordMatcher {
    finder: Finder<'static>,
}

impl WordMatcher {
    /// Creates a matcher for `word`, rejecting the empty word
    pub fn new(word: &str) -> ScanResult<Self> {
        if word.is_empty() {
            return Err(ScanError::EmptyWord);
        }
        Ok(Self {
            finder: Finder::new(word.as_bytes()).into_owned(),
        })
    }

    pub fn word_len(&self) -> usize {
        self.finder.needle().len()
    }

    /// Counts whole-word matches in the entire buffer
    pub fn count_all(&self, buf: &[u8]) -> u64 {
        self.count_in_window(buf, 0..buf.len(), true, true)
    }

    /// Counts whole-word matches whose first byte lies in `window`.
    ///
    /// Boundary checks look at the real neighbouring bytes of `buf`, so the
    /// window may start or end mid-word. `buf_at_file_start` and
    /// `buf_at_file_end` say whether the buffer edges are true file edges;
    /// a match that runs into a non-edge is not counted since the byte
    /// needed for its boundary check was never read.
    pub fn count_in_window(
        &self,
        buf: &[u8],
        window: Range<usize>,
        buf_at_file_start: bool,
        buf_at_file_end: bool,
    ) -> u64 {
        let word_len = self.word_len();
        let end = window.end.min(buf.len());
        let mut pos = window.start;
        let mut count = 0;

        while pos < end {
            // Only candidates starting before `end` matter, but they may extend past it.
            let search_end = (end - 1 + word_len).min(buf.len());
            let Some(found) = self.finder.find(&buf[pos..search_end]) else {
                break;
            };
            let p = pos + found;
            let after = p + word_len;

            let left_ok = if p == 0 {
                buf_at_file_start
            } else {
                !is_word_byte(buf[p - 1])
            };
            let right_ok = if after == buf.len() {
                buf_at_file_end
            } else {
                !is_word_byte(buf[after])
            };
            if left_ok && right_ok {
                count += 1;
            }
            pos = p + 1;
        }

        count
    }
}
