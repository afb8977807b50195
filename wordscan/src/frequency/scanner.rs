use std::io::{BufReader, Read};
use tracing::trace;

use super::table::{FrequencyTable, Submission, MAX_TOKEN_LEN};
use crate::errors::ScanResult;
use crate::metrics::{ScanMetrics, TokenOutcome};
use crate::tokenizer::is_token_byte;

const BUFFER_CAPACITY: usize = 65536;

/// Streams bytes into lowercase tokens and submits them to a shared table
#[derive(Debug, Clone)]
pub struct TokenScanner {
    metrics: ScanMetrics,
}

impl TokenScanner {
    pub fn new(metrics: ScanMetrics) -> Self {
        Self { metrics }
    }

    /// Scans `reader` to the end, returning the number of tokens submitted.
    ///
    /// A token is a run of [`is_token_byte`] bytes. Bytes past
    /// [`MAX_TOKEN_LEN`] are dropped from the token they belong to. On a read
    /// error, tokens already submitted stay in the table.
    pub fn scan<R: Read>(&self, reader: R, table: &FrequencyTable) -> ScanResult<u64> {
        let reader = BufReader::with_capacity(BUFFER_CAPACITY, reader);
        let mut token = String::with_capacity(MAX_TOKEN_LEN);
        let mut submitted = 0;
        let mut bytes_read = 0;

        for byte in reader.bytes() {
            let b = byte?;
            bytes_read += 1;
            if is_token_byte(b) {
                if token.len() < MAX_TOKEN_LEN {
                    token.push(char::from(b.to_ascii_lowercase()));
                }
            } else if !token.is_empty() {
                self.submit(&token, table);
                submitted += 1;
                token.clear();
            }
        }
        if !token.is_empty() {
            self.submit(&token, table);
            submitted += 1;
        }

        self.metrics.record_bytes_read(bytes_read);
        trace!("Submitted {} tokens from {} bytes", submitted, bytes_read);
        Ok(submitted)
    }

    fn submit(&self, token: &str, table: &FrequencyTable) {
        let outcome = match table.submit(token) {
            Submission::Inserted | Submission::Incremented => TokenOutcome::Tracked,
            Submission::Rejected => TokenOutcome::Rejected,
            Submission::Saturated => TokenOutcome::Saturated,
        };
        self.metrics.record_token(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn scan_str(text: &str) -> (u64, FrequencyTable) {
        let table = FrequencyTable::new();
        let submitted = TokenScanner::new(ScanMetrics::new())
            .scan(Cursor::new(text.as_bytes().to_vec()), &table)
            .unwrap();
        (submitted, table)
    }

    #[test]
    fn test_case_is_normalized() {
        let (submitted, table) = scan_str("The the THE");
        assert_eq!(submitted, 3);
        let entries = table.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "the");
        assert_eq!(entries[0].frequency, 3);
    }

    #[test]
    fn test_token_bytes_include_underscore_and_hyphen() {
        let (_, table) = scan_str("well-known snake_case, don't x y 42");
        assert_eq!(table.frequency("well-known"), Some(1));
        assert_eq!(table.frequency("snake_case"), Some(1));
        assert_eq!(table.frequency("don"), Some(1));
        // Single-byte tokens are submitted but rejected.
        assert_eq!(table.frequency("t"), None);
        assert_eq!(table.frequency("x"), None);
        assert_eq!(table.frequency("42"), Some(1));
    }

    #[test]
    fn test_long_tokens_are_truncated() {
        let long = "a".repeat(300);
        let (submitted, table) = scan_str(&format!("{long} b{long}"));
        assert_eq!(submitted, 2);
        assert_eq!(table.frequency(&"a".repeat(MAX_TOKEN_LEN)), Some(1));
        assert_eq!(
            table.frequency(&format!("b{}", "a".repeat(MAX_TOKEN_LEN - 1))),
            Some(1)
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_non_ascii_bytes_separate_tokens() {
        let (_, table) = scan_str("caf\u{e9}s na\u{ef}ve");
        assert_eq!(table.frequency("caf"), Some(1));
        assert_eq!(table.frequency("na"), Some(1));
        assert_eq!(table.frequency("ve"), Some(1));
    }

    #[test]
    fn test_empty_input() {
        let (submitted, table) = scan_str("");
        assert_eq!(submitted, 0);
        assert!(table.is_empty());
    }

    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_error_keeps_earlier_tokens() {
        let table = FrequencyTable::new();
        let reader = FailingReader {
            data: Cursor::new(b"alpha beta ".to_vec()),
        };
        let result = TokenScanner::new(ScanMetrics::new()).scan(reader, &table);
        assert!(result.is_err());
        assert_eq!(table.frequency("alpha"), Some(1));
        assert_eq!(table.frequency("beta"), Some(1));
    }
}
