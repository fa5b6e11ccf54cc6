use crate::error::EditorError;
use crate::renderer::PALETTE_SIZE;

/// Default side length of the drawing grid
pub const GRID_SIZE: usize = 128;

/// Square grid of palette indices, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    cells: Vec<u8>,
    size: usize,
}

impl PixelBuffer {
    /// Create a `size`x`size` buffer with every cell at `fill`
    pub fn new(size: usize, fill: u8) -> Result<Self, EditorError> {
        check_size(size)?;
        check_index(fill as usize)?;
        Ok(Self {
            cells: vec![fill; size * size],
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, y: usize) -> Result<u8, EditorError> {
        let idx = self.offset(x, y)?;
        Ok(self.cells[idx])
    }

    pub fn set(&mut self, x: usize, y: usize, color_index: u8) -> Result<(), EditorError> {
        let idx = self.offset(x, y)?;
        check_index(color_index as usize)?;
        self.cells[idx] = color_index;
        Ok(())
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Row-major copy of every cell (index = y * size + x)
    pub fn to_record(&self) -> Vec<u8> {
        self.cells.clone()
    }

    /// Rebuild a buffer from a row-major record. Nothing is constructed unless
    /// the whole record validates.
    pub fn from_record(size: usize, pixels: &[u8]) -> Result<Self, EditorError> {
        check_size(size)?;
        if pixels.len() != size * size {
            return Err(EditorError::MalformedRecord(format!(
                "expected {} pixels, got {}",
                size * size,
                pixels.len()
            )));
        }

        if let Some((i, value)) = pixels
            .iter()
            .enumerate()
            .find(|(_, &v)| v as usize >= PALETTE_SIZE)
        {
            return Err(EditorError::MalformedRecord(format!(
                "pixel {} holds {}, not a palette index",
                i, value
            )));
        }

        Ok(Self {
            cells: pixels.to_vec(),
            size,
        })
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize, EditorError> {
        if x < self.size && y < self.size {
            Ok(y * self.size + x)
        } else {
            Err(EditorError::CellOutOfRange {
                x: x as i64,
                y: y as i64,
                size: self.size,
            })
        }
    }
}

fn check_size(size: usize) -> Result<(), EditorError> {
    if size == 0 {
        return Err(EditorError::EmptyGrid);
    }
    Ok(())
}

fn check_index(index: usize) -> Result<(), EditorError> {
    if index < PALETTE_SIZE {
        Ok(())
    } else {
        Err(EditorError::IndexOutOfRange(index))
    }
}
