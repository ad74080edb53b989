//! Append-only JSON-lines record store.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::trace;

use crate::collaborators::{BoxFuture, RecordStore};
use crate::error::StoreError;
use crate::sample::LocationRecord;

/// Appends each record to a file as one line of JSON.
///
/// Writes are serialized so concurrent saves never interleave within a
/// line. The file and its parent directory are created on first save.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record from a JSON-lines file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Vec<LocationRecord>, StoreError> {
        let text = tokio::fs::read_to_string(path).await?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }

    async fn append(&self, record: &LocationRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        trace!(path = %self.path.display(), "Record appended");
        Ok(())
    }
}

impl RecordStore for JsonLinesStore {
    fn save(&self, record: LocationRecord) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move { self.append(&record).await })
    }
}
