use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::chunk::MAX_WORKERS;
use crate::errors::{ScanError, ScanResult};
use crate::frequency::CsvOrder;

/// Files analyzed when none are configured (the Calgary corpus)
pub const DEFAULT_FILES: [&str; 7] = [
    "bib", "paper1", "paper2", "progc", "progl", "progp", "trans",
];

/// Which analysis to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Occurrence count, each file split across chunk threads
    #[default]
    Multithreading,
    /// Occurrence count, one child process per file
    Multiprocessing,
    /// Word-frequency histogram
    Top50,
}

/// Configuration for one analysis run.
///
/// # Configuration Locations
///
/// Loaded in order of increasing precedence:
/// 1. Global `$CONFIG_DIR/wordscan/config.yaml`
/// 2. Local `.wordscan.yaml` in the current directory
/// 3. A file given with `--config`
///
/// Command-line values are merged on top with [`merge_with_cli`](Self::merge_with_cli).
/// The invoked subcommand always decides the mode; a `mode` key in a
/// configuration file is overridden by it.
///
/// ```yaml
/// corpus_dir: "./calgary"
/// files: ["bib", "paper1"]
/// worker_count: 8
/// max_concurrency: 4
/// top_n: 50
/// output_path: "word_frequencies.txt"
/// csv_order: insertion
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Directory holding the corpus files
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,

    /// File names inside `corpus_dir`, in submission order
    #[serde(default = "default_files")]
    pub files: Vec<String>,

    /// Word to count; unused in frequency mode
    #[serde(default)]
    pub word: String,

    #[serde(default)]
    pub mode: Mode,

    /// Chunks per file for threaded counting (capped at 8)
    #[serde(default = "default_worker_count")]
    pub worker_count: NonZeroUsize,

    /// Most worker threads alive at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: NonZeroUsize,

    /// Entries shown on the console in frequency mode
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Where the frequency CSV is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default)]
    pub csv_order: CsvOrder,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_files() -> Vec<String> {
    DEFAULT_FILES.iter().map(|f| f.to_string()).collect()
}

fn default_worker_count() -> NonZeroUsize {
    NonZeroUsize::new(MAX_WORKERS).unwrap_or(NonZeroUsize::MIN)
}

fn default_max_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_top_n() -> usize {
    50
}

fn default_output_path() -> PathBuf {
    PathBuf::from("word_frequencies.txt")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
            files: default_files(),
            word: String::new(),
            mode: Mode::default(),
            worker_count: default_worker_count(),
            max_concurrency: default_max_concurrency(),
            top_n: default_top_n(),
            output_path: default_output_path(),
            csv_order: CsvOrder::default(),
            log_level: default_log_level(),
        }
    }
}

impl AnalysisConfig {
    /// Loads configuration, adding `config_path` as the highest-precedence file
    pub fn load_from(config_path: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("wordscan/config.yaml")),
            Some(PathBuf::from(".wordscan.yaml")),
        ];
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist.
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI values over file values; `cli_config` holds defaults for unset flags
    pub fn merge_with_cli(mut self, cli_config: AnalysisConfig) -> Self {
        let defaults = AnalysisConfig::default();

        if cli_config.corpus_dir != defaults.corpus_dir {
            self.corpus_dir = cli_config.corpus_dir;
        }
        if cli_config.files != defaults.files {
            self.files = cli_config.files;
        }
        if !cli_config.word.is_empty() {
            self.word = cli_config.word;
        }
        // The mode always comes from the invoked command.
        self.mode = cli_config.mode;
        if cli_config.worker_count != defaults.worker_count {
            self.worker_count = cli_config.worker_count;
        }
        if cli_config.max_concurrency != defaults.max_concurrency {
            self.max_concurrency = cli_config.max_concurrency;
        }
        if cli_config.top_n != defaults.top_n {
            self.top_n = cli_config.top_n;
        }
        if cli_config.output_path != defaults.output_path {
            self.output_path = cli_config.output_path;
        }
        if cli_config.csv_order != defaults.csv_order {
            self.csv_order = cli_config.csv_order;
        }
        if cli_config.log_level != defaults.log_level {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Paths of the configured files inside `corpus_dir`
    pub fn resolve_files(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| self.corpus_dir.join(f)).collect()
    }

    /// Rejects degenerate input before any scanning starts
    pub fn validate(&self) -> ScanResult<()> {
        if self.files.is_empty() {
            return Err(ScanError::NoFiles);
        }
        if self.mode != Mode::Top50 && self.word.is_empty() {
            return Err(ScanError::EmptyWord);
        }
        Ok(())
    }
}
