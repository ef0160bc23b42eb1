//! Per-file review decisions and the scans that pick the next image to show.
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::fs::{read, rename, write};
use tokio::sync::Mutex;

use crate::error::ReviewError;

/// Review decision for one dataset file, keyed by its relative path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub skipped: bool,
    /// Position of the file in the listing when the decision was made.
    #[serde(default)]
    pub id: i64,
}

impl ProcessedRecord {
    #[inline]
    pub const fn is_processed(&self) -> bool {
        self.confirmed || self.skipped
    }
}

pub type RecordMap = BTreeMap<String, ProcessedRecord>;

#[inline]
fn is_unprocessed(records: &RecordMap, file: &str) -> bool {
    !records.get(file).is_some_and(|r| r.is_processed())
}

/// First file at or after `start` with no decision yet.
pub fn next_unprocessed_index(files: &[String], records: &RecordMap, start: usize) -> Option<usize> {
    files
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, file)| is_unprocessed(records, file))
        .map(|(idx, _)| idx)
}

/// Uniform pick among the files with no decision yet.
///
/// The returned value indexes `files`, not the filtered candidates.
pub fn random_unprocessed_index<R: Rng>(
    files: &[String],
    records: &RecordMap,
    rng: &mut R,
) -> Option<usize> {
    let candidates: Vec<usize> = files
        .iter()
        .enumerate()
        .filter(|(_, file)| is_unprocessed(records, file))
        .map(|(idx, _)| idx)
        .collect();

    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// Shared, persisted map of review decisions.
///
/// Updates are serialized by the lock and each one rewrites the whole file.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: Arc<PathBuf>,
    records: Arc<Mutex<RecordMap>>,
}

impl RecordStore {
    /// Loads the records at `path`. A missing or unreadable file starts an empty map.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = match read(&path).await {
            Ok(bytes) => serde_json::from_slice::<RecordMap>(&bytes).unwrap_or_else(|error| {
                warn!(
                    "Error decoding processed records in {}: {}. Starting empty.",
                    path.display(),
                    error
                );
                RecordMap::new()
            }),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("No processed records at {}", path.display());
                RecordMap::new()
            }
            Err(error) => {
                warn!(
                    "Error loading processed records from {}: {}",
                    path.display(),
                    error
                );
                RecordMap::new()
            }
        };

        debug!("Loaded {} processed records", records.len());
        Self {
            path: Arc::new(path),
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> RecordMap {
        self.records.lock().await.clone()
    }

    /// Stores the decision for `filename` and writes the whole map to disk.
    ///
    /// The in-memory map keeps the new decision even when writing fails.
    pub async fn update(&self, filename: &str, record: ProcessedRecord) -> Result<(), ReviewError> {
        let mut records = self.records.lock().await;
        records.insert(filename.to_string(), record);
        Self::persist(&self.path, &records).await
    }

    async fn persist(path: &Path, records: &RecordMap) -> Result<(), ReviewError> {
        let data = serde_json::to_vec(records)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        write(&tmp, data).await?;
        rename(&tmp, path).await?;
        Ok(())
    }
}
