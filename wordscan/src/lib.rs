pub mod chunk;
pub mod config;
pub mod errors;
pub mod frequency;
pub mod metrics;
pub mod occurrence;
pub mod process;
pub mod results;
pub mod scheduler;
pub mod tokenizer;

pub use config::{AnalysisConfig, Mode};
pub use errors::{ScanError, ScanResult};
pub use results::{FileCount, FileStatus, OccurrenceReport};
