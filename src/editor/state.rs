use super::brush::{MAX_RADIUS, MIN_RADIUS};
use crate::error::EditorError;
use crate::renderer::PALETTE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
    pub on_screen: bool,
}

/// Mutable session state owned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorState {
    pub cursor: Cursor,
    pub brush_radius: u32,
    pub color_index: u8,
}

impl EditorState {
    pub fn new(brush_radius: u32, color_index: u8) -> Self {
        Self {
            cursor: Cursor::default(),
            brush_radius: brush_radius.clamp(MIN_RADIUS, MAX_RADIUS),
            color_index: color_index % PALETTE_SIZE as u8,
        }
    }

    pub fn cycle_color_up(&mut self) {
        self.color_index = ((self.color_index as usize + 1) % PALETTE_SIZE) as u8;
    }

    pub fn cycle_color_down(&mut self) {
        self.color_index = ((self.color_index as usize + PALETTE_SIZE - 1) % PALETTE_SIZE) as u8;
    }

    pub fn grow_brush(&mut self) {
        self.brush_radius = (self.brush_radius + 1).min(MAX_RADIUS);
    }

    pub fn shrink_brush(&mut self) {
        self.brush_radius = self.brush_radius.saturating_sub(1).max(MIN_RADIUS);
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(2, 4)
    }
}

/// Maps pointer coordinates on a square display of `display_size` logical
/// units onto an `grid_size`x`grid_size` grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorTracker {
    display_size: f64,
    grid_size: usize,
}

impl CursorTracker {
    pub fn new(display_size: f64, grid_size: usize) -> Self {
        Self {
            display_size,
            grid_size,
        }
    }

    pub fn set_display_size(&mut self, display_size: f64) {
        self.display_size = display_size;
    }

    /// `floor(device / (display_size / grid_size))` per axis. Coordinates outside
    /// the display are rejected, never clamped.
    pub fn to_grid(&self, x: f64, y: f64) -> Result<(usize, usize), EditorError> {
        let inside = |v: f64| v.is_finite() && v >= 0.0 && v < self.display_size;
        if !(inside(x) && inside(y)) {
            return Err(EditorError::PointerOutOfRange {
                x,
                y,
                size: self.display_size,
            });
        }

        let cell = self.display_size / self.grid_size as f64;
        // Float rounding can land exactly on grid_size for points just inside the edge
        let last = self.grid_size.saturating_sub(1);
        let gx = ((x / cell).floor() as usize).min(last);
        let gy = ((y / cell).floor() as usize).min(last);
        Ok((gx, gy))
    }
}
