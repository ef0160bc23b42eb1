//! Resumable pagination cursor.
//!
//! The crawl position is kept in a small text file holding a single integer, one file per search
//! query, so an interrupted crawl restarts at the last fully processed page.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use tokio::fs::{read_to_string, write};

use crate::error::QueueError;

/// Offset used when no usable offset file exists.
pub const DEFAULT_OFFSET: u64 = 1;

/// Name of the offset file for a search query, or for the popular feed when `query` is empty.
pub fn offset_file_name(query: Option<&str>) -> String {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => {
            let safe: String = q
                .chars()
                .map(|c| {
                    if c.is_whitespace() || matches!(c, '/' | '\\' | ':') {
                        '_'
                    } else {
                        c
                    }
                })
                .collect();
            format!("offset-{safe}.txt")
        }
        _ => String::from("offset.txt"),
    }
}

/// Parses the leading integer of the first line.
fn parse_offset(contents: &str) -> Option<u64> {
    let line = contents.lines().next()?.trim_start();
    let end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    line[..end].parse().ok()
}

#[derive(Debug, Clone)]
pub struct OffsetStore {
    path: PathBuf,
}

impl OffsetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the given query inside `dir`.
    pub fn for_query(dir: &Path, query: Option<&str>) -> Self {
        Self::new(dir.join(offset_file_name(query)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the saved offset. Never fails: anything unusable falls back to [`DEFAULT_OFFSET`].
    pub async fn load(&self) -> u64 {
        let contents = match read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("No offset file at {}", self.path.display());
                return DEFAULT_OFFSET;
            }
            Err(error) => {
                error!(
                    "Error loading offset from {}: {}",
                    self.path.display(),
                    error
                );
                return DEFAULT_OFFSET;
            }
        };

        parse_offset(&contents).unwrap_or_else(|| {
            warn!(
                "Offset file {} does not start with a number, starting from {}",
                self.path.display(),
                DEFAULT_OFFSET
            );
            DEFAULT_OFFSET
        })
    }

    /// Overwrites the offset file with `offset` followed by a newline.
    pub async fn save(&self, offset: u64) -> Result<(), QueueError> {
        write(&self.path, format!("{offset}\n")).await?;
        debug!("Saved offset {} to {}", offset, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn file_names_per_query() {
        assert_eq!(offset_file_name(None), "offset.txt");
        assert_eq!(offset_file_name(Some("")), "offset.txt");
        assert_eq!(offset_file_name(Some("red hair")), "offset-red_hair.txt");
        assert_eq!(offset_file_name(Some("a/b")), "offset-a_b.txt");
    }

    #[test]
    fn parses_leading_integer() {
        assert_eq!(parse_offset("26\n"), Some(26));
        assert_eq!(parse_offset("  41 trailing\nignored"), Some(41));
        assert_eq!(parse_offset("abc"), None);
        assert_eq!(parse_offset("-5"), None);
        assert_eq!(parse_offset(""), None);
    }

    #[tokio::test]
    async fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::for_query(dir.path(), None);

        for offset in [0, 1, 6, 1_000_001] {
            store.save(offset).await.unwrap();
            assert_eq!(store.load().await, offset);
        }

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "1000001\n");
    }

    #[tokio::test]
    async fn missing_file_defaults_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::for_query(dir.path(), Some("nothing yet"));

        assert_eq!(store.load().await, DEFAULT_OFFSET);
    }

    #[tokio::test]
    async fn corrupt_file_defaults_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::for_query(dir.path(), None);
        std::fs::write(store.path(), "not a number\n").unwrap();

        assert_eq!(store.load().await, DEFAULT_OFFSET);
    }

    #[tokio::test]
    async fn unreadable_path_defaults_to_one() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be can't be read as text.
        let store = OffsetStore::new(dir.path());

        assert_eq!(store.load().await, DEFAULT_OFFSET);
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::new(dir.path().join("missing").join("offset.txt"));

        assert!(store.save(11).await.is_err());
    }
}
