//! Reader worker pool.
//!
//! Readers drain the walker's channel, pull file contents into memory
//! (capped at the configured read size) and reject anything the search
//! should never see: empty files, binary files detected by a NUL byte in
//! the leading bytes (the same check GNU grep, git and ripgrep use), and
//! minified files detected by average line length. Files surviving the
//! filters become [`FileJob`]s for the searcher pool.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::config::SearchOptions;
use crate::search::types::FileJob;
use crate::search::walker::FileEntry;

/// How many leading bytes are scanned for a NUL when detecting binary
/// files.
const BINARY_CHECK_BYTES: usize = 10_000;

/// Read the file into memory, but only up to the configured size since
/// anything beyond that is probably pointless to search.
fn read_file_content(path: &Path, max_read_size: u64) -> Option<Vec<u8>> {
    let meta = std::fs::symlink_metadata(path).ok()?;

    if meta.len() < max_read_size {
        return std::fs::read(path).ok();
    }

    let file = File::open(path).ok()?;
    let mut content = Vec::with_capacity(max_read_size as usize);
    file.take(max_read_size).read_to_end(&mut content).ok()?;
    Some(content)
}

/// Read and vet a candidate file, returning its content when it should
/// be searched.
fn process_file(entry: &FileEntry, options: &SearchOptions) -> Option<Vec<u8>> {
    let content = read_file_content(&entry.location, options.max_read_size_bytes)?;

    if content.is_empty() {
        debug!(file = %entry.location.display(), "empty file so moving on");
        return None;
    }

    if !options.include_binary {
        let check = &content[..content.len().min(BINARY_CHECK_BYTES)];
        if memchr::memchr(0, check).is_some() {
            debug!(file = %entry.location.display(), "file determined to be binary so moving on");
            return None;
        }
    }

    if !options.include_minified {
        let newlines = memchr::memchr_iter(b'\n', &content).count();
        let sum_line_length = content.len() - newlines;
        let average_line_length = sum_line_length / (newlines + 1);

        if average_line_length > options.minified_line_byte_length {
            debug!(file = %entry.location.display(), "file determined to be minified so moving on");
            return None;
        }
    }

    Some(content)
}

/// Case-insensitive subsequence match of `pattern` against `name`, the
/// filter behind the `file:` query syntax. Every pattern rune must appear
/// in the name in order, not necessarily adjacent.
pub fn fuzzy_match_fold(pattern: &str, name: &str) -> bool {
    let mut name_chars = name.chars().flat_map(char::to_lowercase);
    pattern
        .chars()
        .flat_map(char::to_lowercase)
        .all(|p| name_chars.any(|n| n == p))
}

/// Spawn the reader pool. `file_count` tracks how many files were
/// actually read, which later serves as the corpus size for ranking.
pub fn spawn_readers(
    input: Receiver<FileEntry>,
    output: Sender<FileJob>,
    options: Arc<SearchOptions>,
    filename_fuzzy: String,
    file_count: Arc<AtomicUsize>,
    cancel: Arc<AtomicBool>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..workers)
        .map(|_| {
            let input = input.clone();
            let output = output.clone();
            let options = Arc::clone(&options);
            let filename_fuzzy = filename_fuzzy.clone();
            let file_count = Arc::clone(&file_count);
            let cancel = Arc::clone(&cancel);

            std::thread::spawn(move || {
                for entry in input.iter() {
                    if cancel.load(Ordering::Relaxed) {
                        continue;
                    }

                    if !filename_fuzzy.is_empty()
                        && !fuzzy_match_fold(&filename_fuzzy, &entry.filename)
                    {
                        continue;
                    }

                    if let Some(content) = process_file(&entry, &options) {
                        file_count.fetch_add(1, Ordering::Relaxed);

                        let extension = entry
                            .location
                            .extension()
                            .map(|ext| ext.to_string_lossy().into_owned())
                            .unwrap_or_default();

                        let job = FileJob {
                            filename: entry.filename,
                            extension,
                            location: entry.location.to_string_lossy().into_owned(),
                            bytes: content.len(),
                            content,
                            score: 0.0,
                            match_locations: Default::default(),
                        };

                        if output.send(job).is_err() {
                            break;
                        }
                    }
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry(path: &Path) -> FileEntry {
        FileEntry {
            location: path.to_path_buf(),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_process_file_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.txt");
        fs::write(&path, "some text content\n").unwrap();

        let content = process_file(&entry(&path), &SearchOptions::default());
        assert_eq!(content.as_deref(), Some("some text content\n".as_bytes()));
    }

    #[test]
    fn test_process_file_rejects_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        assert!(process_file(&entry(&path), &SearchOptions::default()).is_none());
    }

    #[test]
    fn test_process_file_rejects_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, b"with a \x00 byte").unwrap();

        let options = SearchOptions::default();
        assert!(process_file(&entry(&path), &options).is_none());

        let options = SearchOptions {
            include_binary: true,
            ..Default::default()
        };
        assert!(process_file(&entry(&path), &options).is_some());
    }

    #[test]
    fn test_process_file_rejects_minified() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.min.js");
        fs::write(&path, "x".repeat(2000)).unwrap();

        let options = SearchOptions::default();
        assert!(process_file(&entry(&path), &options).is_none());

        let options = SearchOptions {
            include_minified: true,
            ..Default::default()
        };
        assert!(process_file(&entry(&path), &options).is_some());
    }

    #[test]
    fn test_process_file_average_line_length_threshold() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.txt");
        // Two lines of 100 bytes: average is well under the 255 default
        let line = "y".repeat(100);
        fs::write(&path, format!("{line}\n{line}\n")).unwrap();

        assert!(process_file(&entry(&path), &SearchOptions::default()).is_some());
    }

    #[test]
    fn test_read_file_content_caps_large_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("large.txt");
        fs::write(&path, "z".repeat(500)).unwrap();

        let content = read_file_content(&path, 100).unwrap();
        assert_eq!(content.len(), 100);
    }

    #[test]
    fn test_read_file_content_missing_file() {
        assert!(read_file_content(Path::new("/does/not/exist"), 100).is_none());
    }

    #[test]
    fn test_fuzzy_match_fold() {
        assert!(fuzzy_match_fold("tst", "test.go"));
        assert!(fuzzy_match_fold("TEST", "my_test.rs"));
        assert!(fuzzy_match_fold(".go", "main.go"));
        assert!(!fuzzy_match_fold("xyz", "main.go"));
        assert!(!fuzzy_match_fold("tset", "test.go"));
        assert!(fuzzy_match_fold("", "anything"));
    }
}
