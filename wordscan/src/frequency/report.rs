use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::table::FrequencyEntry;
use crate::errors::ScanResult;
use crate::results::FileStatus;

/// Row order of the CSV artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvOrder {
    /// The order words were first tracked in
    #[default]
    Insertion,
    /// Descending frequency, ties by word
    Ranked,
}

/// Status of one input file in a frequency run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileScan {
    pub path: PathBuf,
    pub tokens: u64,
    pub status: FileStatus,
}

/// Final contents of a frequency run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyReport {
    /// Tracked words in insertion order
    pub entries: Vec<FrequencyEntry>,
    /// Per-file results, in submission order
    pub files: Vec<FileScan>,
}

/// Descending frequency, then ascending word
pub fn rank_order(a: &FrequencyEntry, b: &FrequencyEntry) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| a.word.cmp(&b.word))
}

impl FrequencyReport {
    pub fn new(entries: Vec<FrequencyEntry>, files: Vec<FileScan>) -> Self {
        Self { entries, files }
    }

    /// All entries sorted by [`rank_order`]
    pub fn ranked(&self) -> Vec<FrequencyEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(rank_order);
        ranked
    }

    /// The `n` most frequent entries
    pub fn top(&self, n: usize) -> Vec<FrequencyEntry> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    pub fn files_with_errors(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !f.status.is_complete())
            .count()
    }

    /// Writes `word,frequency` rows to `writer`
    pub fn write_csv_to<W: Write>(&self, writer: &mut W, order: CsvOrder) -> ScanResult<()> {
        writeln!(writer, "word,frequency")?;
        let ranked;
        let rows = match order {
            CsvOrder::Insertion => &self.entries,
            CsvOrder::Ranked => {
                ranked = self.ranked();
                &ranked
            }
        };
        for entry in rows {
            writeln!(writer, "{},{}", entry.word, entry.frequency)?;
        }
        Ok(())
    }

    /// Writes the CSV artifact to `path` through a temporary sibling file
    pub fn write_csv(&self, path: &Path, order: CsvOrder) -> ScanResult<()> {
        let tmp_path = path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        self.write_csv_to(&mut writer, order)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp_path, path)?;
        debug!("Wrote {} rows to {}", self.entries.len(), path.display());
        Ok(())
    }
}
