//! Whole-word occurrence counting with chunked thread workers.
//!
//! A file is split by [`crate::chunk::ChunkPlan`] into at most eight chunks.
//! Each chunk worker reads its read window, counts matches whose first byte
//! falls in its counting window, and adds the result to one
//! [`OccurrenceCounter`] per file:
//! ```rust,ignore
//! let report = count_word_in_files(&files, "the", 8, NonZeroUsize::new(4).unwrap())?;
//! println!("{}", report.total);
//! ```
//! Because boundary checks always look at real neighbouring bytes, the
//! chunked total equals [`ChunkProcessor::process_whole_file`] on the same
//! file.
pub mod counter;
pub mod engine;
pub mod matcher;
pub mod processor;

pub use counter::OccurrenceCounter;
pub use engine::{count_word_in_file, count_word_in_files};
pub use matcher::WordMatcher;
pub use processor::{ChunkProcessor, FileBytes};
