use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::{is_valid_id, ArtworkRecord, ArtworkStore};
use crate::error::StoreError;

/// One `<uuid>.json` file per artwork inside a directory
pub struct DirStore {
    root: PathBuf,
    grid_size: usize,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>, grid_size: usize) -> Self {
        Self {
            root: root.into(),
            grid_size,
        }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    /// Parse and shape-check a stored record
    fn parse(&self, id: &str, contents: &[u8]) -> Result<ArtworkRecord, StoreError> {
        let malformed = |reason: String| StoreError::MalformedRecord {
            id: id.to_string(),
            reason,
        };

        let record: ArtworkRecord =
            serde_json::from_slice(contents).map_err(|e| malformed(e.to_string()))?;
        if record.uuid != id {
            return Err(malformed(format!("file holds uuid {}", record.uuid)));
        }
        record
            .to_buffer(self.grid_size)
            .map_err(|e| malformed(e.to_string()))?;

        Ok(record)
    }
}

/// Write all of `bytes`, removing the half-written file at `path` on failure
async fn write_or_remove<W: AsyncWrite + Unpin>(mut file: W, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!(path = %path.display(), "failed to remove partial artwork: {}", cleanup);
        }
        return Err(e);
    }
    Ok(())
}

#[async_trait]
impl ArtworkStore for DirStore {
    async fn create(&self, record: ArtworkRecord) -> Result<String, StoreError> {
        if !is_valid_id(&record.uuid) {
            return Err(StoreError::Storage(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid artwork id: {}", record.uuid),
            )));
        }

        fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_vec(&record)
            .map_err(|e| StoreError::Storage(io::Error::new(ErrorKind::InvalidData, e)))?;

        // create_new: an id is never reused
        let path = self.record_path(&record.uuid);
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        write_or_remove(file, &path, &json).await?;

        debug!(id = %record.uuid, root = %self.root.display(), "stored artwork");
        Ok(record.uuid)
    }

    async fn get(&self, id: &str) -> Result<ArtworkRecord, StoreError> {
        if !is_valid_id(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let contents = match fs::read(self.record_path(id)).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        self.parse(id, &contents)
    }

    async fn list(&self) -> Result<Vec<ArtworkRecord>, StoreError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                debug!(path = %path.display(), "skipping non-file entry");
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            let parsed = match fs::read(&path).await {
                Ok(contents) => self.parse(&id, &contents),
                Err(e) => Err(e.into()),
            };
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), "skipping artwork: {}", e),
            }
        }

        Ok(records)
    }
}
