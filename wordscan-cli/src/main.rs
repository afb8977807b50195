use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wordscan::{
    frequency::{count_frequencies, CsvOrder, FrequencyReport},
    occurrence::count_word_in_files,
    process::{count_word_multiprocess, run_worker, WorkerCommand, WORKER_SUBCOMMAND},
    AnalysisConfig, FileStatus, Mode, OccurrenceReport, ScanError,
};

type Result<T> = std::result::Result<T, ScanError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CorpusArgs {
    /// Directory holding the corpus files
    #[arg(short = 'd', long, default_value = ".")]
    dir: PathBuf,

    /// Comma-separated file names inside the directory (default: the Calgary corpus)
    #[arg(short = 'f', long, value_delimiter = ',')]
    files: Vec<String>,

    /// Maximum number of worker threads alive at once
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CountMode {
    /// Split each file across chunk threads
    Multithreading,
    /// Scan each file in its own child process
    Multiprocessing,
}

#[derive(Clone, Copy, ValueEnum)]
enum CsvRowOrder {
    /// The order words were first seen in
    Insertion,
    /// Most frequent first, ties by word
    Ranked,
}

impl From<CsvRowOrder> for CsvOrder {
    fn from(order: CsvRowOrder) -> Self {
        match order {
            CsvRowOrder::Insertion => CsvOrder::Insertion,
            CsvRowOrder::Ranked => CsvOrder::Ranked,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Count whole-word occurrences of a word in every corpus file
    Count {
        /// Word to count (case-sensitive)
        word: String,

        #[arg(short, long, value_enum, default_value = "multithreading")]
        mode: CountMode,

        /// Chunks per file in multithreading mode (at most 8)
        #[arg(short = 'w', long)]
        workers: Option<NonZeroUsize>,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Build a word-frequency histogram and show the most frequent words
    #[command(name = "top50", alias = "frequency")]
    Top50 {
        /// Number of entries to show
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// CSV output path (default: word_frequencies.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Row order of the CSV file
        #[arg(long, value_enum)]
        csv_order: Option<CsvRowOrder>,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Count a word in one file and write the result to stdout as 8 raw bytes
    #[command(name = WORKER_SUBCOMMAND, hide = true)]
    ScanWorker { path: PathBuf, word: String },
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::ScanWorker { path, word } = &cli.command {
        init_logging("warn");
        let mut stdout = io::stdout().lock();
        run_worker(path, word, &mut stdout)?;
        return Ok(());
    }

    let cli_config = cli_config(&cli.command);
    let config = AnalysisConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli_config);
    init_logging(&config.log_level);
    config.validate()?;

    let files = config.resolve_files();
    debug!("Running {:?} over {} files", config.mode, files.len());
    let start = Instant::now();

    match config.mode {
        Mode::Multithreading => {
            let report = count_word_in_files(
                &files,
                &config.word,
                config.worker_count.get(),
                config.max_concurrency,
            )?;
            print_occurrence_report(&report, cli.json)?;
        }
        Mode::Multiprocessing => {
            let worker = WorkerCommand::current_exe()?;
            let report = count_word_multiprocess(&files, &config.word, &worker)?;
            print_occurrence_report(&report, cli.json)?;
        }
        Mode::Top50 => {
            let report = count_frequencies(&files, config.max_concurrency)?;
            report.write_csv(&config.output_path, config.csv_order)?;
            print_frequency_report(&report, &config, cli.json)?;
        }
    }

    if !cli.json {
        println!(
            "Time taken: {}",
            humantime::format_duration(start.elapsed())
        );
    }
    Ok(())
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second initialization only happens in tests; ignoring it keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Builds the CLI side of the configuration; unset flags keep default values
fn cli_config(command: &Commands) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    let corpus = match command {
        Commands::Count {
            word,
            mode,
            workers,
            corpus,
        } => {
            config.word = word.clone();
            config.mode = match mode {
                CountMode::Multithreading => Mode::Multithreading,
                CountMode::Multiprocessing => Mode::Multiprocessing,
            };
            if let Some(workers) = workers {
                config.worker_count = *workers;
            }
            corpus
        }
        Commands::Top50 {
            top,
            output,
            csv_order,
            corpus,
        } => {
            config.mode = Mode::Top50;
            if let Some(top) = top {
                config.top_n = *top;
            }
            if let Some(output) = output {
                config.output_path = output.clone();
            }
            if let Some(order) = csv_order {
                config.csv_order = (*order).into();
            }
            corpus
        }
        Commands::ScanWorker { .. } => return config,
    };

    config.corpus_dir = corpus.dir.clone();
    if !corpus.files.is_empty() {
        config.files = corpus.files.clone();
    }
    if let Some(threads) = corpus.threads {
        config.max_concurrency = threads;
    }
    config
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_status(status: &FileStatus) {
    match status {
        FileStatus::Complete => {}
        FileStatus::Partial { failed_workers } => {
            println!("  {}", format!("{} workers failed", failed_workers).yellow())
        }
        FileStatus::Unreadable(msg) => println!("  {}", format!("unreadable: {}", msg).red()),
        FileStatus::LaunchFailed(msg) => {
            println!("  {}", format!("worker not started: {}", msg).red())
        }
        FileStatus::ChannelFailed(msg) => {
            println!("  {}", format!("no result from worker: {}", msg).red())
        }
    }
}

fn print_json(value: serde_json::Value) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &value)?;
    writeln!(stdout)?;
    Ok(())
}

fn print_occurrence_report(report: &OccurrenceReport, json: bool) -> Result<()> {
    if json {
        return print_json(serde_json::to_value(report)?);
    }

    for file_count in &report.file_counts {
        println!(
            "Count of the word '{}' in file '{}': {}",
            report.word,
            file_name(&file_count.path).blue(),
            file_count.occurrences.to_string().green()
        );
        print_status(&file_count.status);
    }
    println!(
        "Total count of the word '{}': {}",
        report.word,
        report.total.to_string().green()
    );
    Ok(())
}

fn print_frequency_report(
    report: &FrequencyReport,
    config: &AnalysisConfig,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(serde_json::to_value(report)?);
    }

    for scan in &report.files {
        if !scan.status.is_complete() {
            println!("{}", file_name(&scan.path).blue());
            print_status(&scan.status);
        }
    }

    let top = report.top(config.top_n);
    println!("Top {} most frequent words:", top.len());
    for (rank, entry) in top.iter().enumerate() {
        println!(
            "{:>4}. {:<24} {}",
            rank + 1,
            entry.word,
            entry.frequency.to_string().green()
        );
    }
    println!(
        "Wrote {} words to {}",
        report.entries.len(),
        config.output_path.display().to_string().blue()
    );
    Ok(())
}
