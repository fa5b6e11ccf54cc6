mod client;
mod dir_store;

pub use client::{Completion, PersistenceClient};
pub use dir_store::DirStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::editor::PixelBuffer;
use crate::error::{EditorError, StoreError};

/// A saved artwork as it crosses the persistence boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    pub uuid: String,
    pub pixels: Vec<u8>,
}

impl ArtworkRecord {
    pub fn from_buffer(uuid: String, buffer: &PixelBuffer) -> Self {
        Self {
            uuid,
            pixels: buffer.to_record(),
        }
    }

    /// Validate and convert into a buffer of the given grid size
    pub fn to_buffer(&self, size: usize) -> Result<PixelBuffer, EditorError> {
        PixelBuffer::from_record(size, &self.pixels)
    }
}

/// Flat record store: create, read by id, list
#[async_trait]
pub trait ArtworkStore: Send + Sync {
    async fn create(&self, record: ArtworkRecord) -> Result<String, StoreError>;
    async fn get(&self, id: &str) -> Result<ArtworkRecord, StoreError>;
    async fn list(&self) -> Result<Vec<ArtworkRecord>, StoreError>;
}

/// Fresh random (version 4) UUID in canonical hyphenated form
pub fn new_id() -> Result<String, StoreError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| StoreError::Storage(std::io::Error::other(e.to_string())))?;
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

/// True for the canonical 8-4-4-4-12 hex layout
pub fn is_valid_id(id: &str) -> bool {
    let groups: Vec<&str> = id.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()))
}
