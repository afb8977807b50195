//! Word-frequency counting over a bounded shared table.
pub mod engine;
pub mod report;
pub mod scanner;
pub mod table;

pub use engine::{count_frequencies, count_frequencies_into};
pub use report::{rank_order, CsvOrder, FileScan, FrequencyReport};
pub use scanner::TokenScanner;
pub use table::{FrequencyEntry, FrequencyTable, Submission, TABLE_CAPACITY};
