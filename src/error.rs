use thiserror::Error;

/// Errors raised by the editor engine (buffer, palette, cursor mapping).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("cell ({x}, {y}) is outside the {size}x{size} grid")]
    CellOutOfRange { x: i64, y: i64, size: usize },

    #[error("palette index {0} is outside 0..16")]
    IndexOutOfRange(usize),

    #[error("pointer ({x}, {y}) is outside the {size}x{size} display")]
    PointerOutOfRange { x: f64, y: f64, size: f64 },

    #[error("grid size must be at least 1")]
    EmptyGrid,

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl EditorError {
    /// True for every variant of the out-of-range class
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            EditorError::CellOutOfRange { .. }
                | EditorError::IndexOutOfRange(_)
                | EditorError::PointerOutOfRange { .. }
        )
    }
}

/// Errors raised at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no artwork with id {0}")]
    NotFound(String),

    #[error("artwork {id} is malformed: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}
