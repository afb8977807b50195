use anyhow::Result;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use wordscan::chunk::{ByteRange, ChunkPlan, ChunkSpec};
use wordscan::frequency::{count_frequencies, FrequencyTable, Submission, TABLE_CAPACITY};
use wordscan::occurrence::{count_word_in_file, count_word_in_files, ChunkProcessor, WordMatcher};
use wordscan::scheduler::BatchScheduler;
use wordscan::{FileStatus, ScanError};

fn threads(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok(path)
}

fn chunked_count(path: &Path, word: &str, workers: usize) -> Result<u64> {
    let processor = ChunkProcessor::new(WordMatcher::new(word)?);
    let scheduler = BatchScheduler::new(threads(8), "test");
    let file_count = count_word_in_file(path, &processor, workers, &scheduler)?;
    assert!(file_count.status.is_complete());
    Ok(file_count.occurrences)
}

/// Deterministic pseudo-random text over a tiny alphabet so matches and near-misses are dense
fn noisy_text(seed: u64, len: usize) -> Vec<u8> {
    const ALPHABET: &[u8] = b"ab  c-a.b";
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ALPHABET[(state % ALPHABET.len() as u64) as usize]
        })
        .collect()
}

#[test]
fn test_chunked_total_equals_single_pass() -> Result<()> {
    let dir = tempdir()?;
    for (seed, len) in (0..40u64).zip((0..400).step_by(10)) {
        let content = noisy_text(seed + 1, len);
        let path = write_file(&dir, &format!("noise_{seed}"), &content)?;

        for word in ["a", "ab", "a b", "c-a"] {
            let single = WordMatcher::new(word)?.count_all(&content);
            for workers in 1..=8 {
                assert_eq!(
                    chunked_count(&path, word, workers)?,
                    single,
                    "word {word:?}, {workers} workers, content {:?}",
                    String::from_utf8_lossy(&content)
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_straddling_word_counted_once() -> Result<()> {
    let dir = tempdir()?;
    let size = 48;
    for word in ["cat", "needle"] {
        for pos in 1..size - word.len() - 1 {
            let mut content = vec![b' '; size];
            content[pos..pos + word.len()].copy_from_slice(word.as_bytes());
            let path = write_file(&dir, "straddle", &content)?;

            for workers in 1..=8 {
                assert_eq!(
                    chunked_count(&path, word, workers)?,
                    1,
                    "{word} at {pos} with {workers} workers"
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_every_split_point_of_short_sentence() -> Result<()> {
    let dir = tempdir()?;
    let text = b"the cat sat";
    let path = write_file(&dir, "sentence", text)?;
    let processor = ChunkProcessor::new(WordMatcher::new("cat")?);
    let size = text.len() as u64;
    let overlap = 6;

    for split in 0..=size {
        let left = ChunkSpec {
            read: ByteRange::new(0, (split + overlap).min(size)),
            count: ByteRange::new(0, split),
        };
        let right = ChunkSpec {
            read: ByteRange::new(split.saturating_sub(overlap), size),
            count: ByteRange::new(split, size),
        };
        let total = processor.process_chunk(&path, &left, size)?
            + processor.process_chunk(&path, &right, size)?;
        assert_eq!(total, 1, "split at {split}");
    }
    Ok(())
}

#[test]
fn test_adjacent_false_match() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "concat", b"concatenate")?;
    for workers in 1..=8 {
        assert_eq!(chunked_count(&path, "cat", workers)?, 0);
    }
    Ok(())
}

#[test]
fn test_empty_file() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "empty", b"")?;

    assert!(ChunkPlan::new(0, 8, 3)?.is_empty());
    assert_eq!(chunked_count(&path, "cat", 8)?, 0);

    let report = count_frequencies(&[path], threads(4))?;
    assert!(report.entries.is_empty());
    Ok(())
}

#[test]
fn test_multiple_files_report() -> Result<()> {
    let dir = tempdir()?;
    let files = vec![
        write_file(&dir, "bib", "and the rest and more\n".repeat(100).as_bytes())?,
        dir.path().join("paper1"),
        write_file(&dir, "paper2", b"android AND and")?,
    ];

    let report = count_word_in_files(&files, "and", 8, threads(3))?;
    assert_eq!(report.file_counts[0].occurrences, 200);
    assert!(matches!(
        report.file_counts[1].status,
        FileStatus::Unreadable(_)
    ));
    assert_eq!(report.file_counts[2].occurrences, 1);
    assert_eq!(report.total, 201);
    assert_eq!(report.files_with_errors, 1);
    Ok(())
}

#[test]
fn test_frequency_is_order_independent() -> Result<()> {
    let dir = tempdir()?;
    let files = vec![
        write_file(&dir, "progc", b"int main int argc char argv return")?,
        write_file(&dir, "progl", b"defun car cdr car lambda return")?,
        write_file(&dir, "progp", b"program begin end begin end return int")?,
    ];

    let baseline = count_frequencies(&files, threads(3))?.ranked();
    let orders = [[2, 1, 0], [1, 0, 2], [0, 2, 1]];
    for order in orders {
        let shuffled: Vec<PathBuf> = order.iter().map(|&i| files[i].clone()).collect();
        for cap in [1, 2, 3] {
            let ranked = count_frequencies(&shuffled, threads(cap))?.ranked();
            assert_eq!(ranked, baseline);
        }
    }
    assert_eq!(baseline[0].word, "int");
    assert_eq!(baseline[0].frequency, 3);
    assert_eq!(baseline[1].word, "return");
    assert_eq!(baseline[1].frequency, 3);
    Ok(())
}

#[test]
fn test_case_normalization() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "trans", b"The the THE")?;

    let report = count_frequencies(&[path], threads(1))?;
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].word, "the");
    assert_eq!(report.entries[0].frequency, 3);
    Ok(())
}

#[test]
fn test_capacity_boundary() -> Result<()> {
    let table = FrequencyTable::new();
    for i in 0..TABLE_CAPACITY {
        table.submit(&format!("word{i:04}"));
    }
    assert_eq!(table.submit("one-too-many"), Submission::Saturated);
    assert_eq!(table.len(), TABLE_CAPACITY);

    let dir = tempdir()?;
    let text: String = (0..TABLE_CAPACITY + 5)
        .map(|i| format!("w{i} "))
        .collect();
    let path = write_file(&dir, "wide", text.as_bytes())?;
    let report = count_frequencies(&[path], threads(1))?;
    assert_eq!(report.entries.len(), TABLE_CAPACITY);
    assert!(report.entries.iter().all(|e| e.word != "w1000"));
    Ok(())
}

#[test]
fn test_degenerate_input() -> Result<()> {
    assert!(matches!(
        count_word_in_files(&[PathBuf::from("bib")], "", 8, threads(8)),
        Err(ScanError::EmptyWord)
    ));
    assert!(matches!(
        count_frequencies(&[], threads(8)),
        Err(ScanError::NoFiles)
    ));
    Ok(())
}
