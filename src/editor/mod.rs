pub mod brush;
pub mod fill;
mod grid;
mod state;

pub use grid::{PixelBuffer, GRID_SIZE};
pub use state::{Cursor, CursorTracker, EditorState};

use crate::error::EditorError;
use crate::input::{Action, EditorEvent};
use tracing::debug;

/// What an event did to the buffer, so callers know when a frame is stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Only session state (cursor, color, radius) changed
    StateOnly,
    /// `n` cells were written
    Painted(usize),
}

/// Owns the pixel buffer and session state, and applies input events to them.
pub struct EditorController {
    buffer: PixelBuffer,
    state: EditorState,
    tracker: CursorTracker,
}

impl EditorController {
    pub fn new(buffer: PixelBuffer, state: EditorState, display_size: f64) -> Self {
        let tracker = CursorTracker::new(display_size, buffer.size());
        Self {
            buffer,
            state,
            tracker,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn set_display_size(&mut self, display_size: f64) {
        self.tracker.set_display_size(display_size);
    }

    /// Swap in a whole buffer (e.g. a loaded artwork). The grid size is fixed for
    /// the session, so a buffer of another size is rejected and nothing changes.
    pub fn replace_buffer(&mut self, buffer: PixelBuffer) -> Result<(), EditorError> {
        if buffer.size() != self.buffer.size() {
            return Err(EditorError::MalformedRecord(format!(
                "artwork is {}x{}, session grid is {}x{}",
                buffer.size(),
                buffer.size(),
                self.buffer.size(),
                self.buffer.size()
            )));
        }
        self.buffer = buffer;
        Ok(())
    }

    /// Apply one input event
    pub fn handle(&mut self, event: EditorEvent) -> Result<Outcome, EditorError> {
        match event {
            EditorEvent::Key { action } => self.handle_action(action),
            EditorEvent::PointerMove { x, y, primary } => {
                let (gx, gy) = self.tracker.to_grid(x, y)?;
                self.state.cursor = Cursor {
                    x: gx,
                    y: gy,
                    on_screen: true,
                };
                if primary {
                    self.stamp_at_cursor()
                } else {
                    Ok(Outcome::StateOnly)
                }
            }
            EditorEvent::PointerLeave => {
                self.state.cursor.on_screen = false;
                Ok(Outcome::StateOnly)
            }
            EditorEvent::PointerPress => {
                if self.state.cursor.on_screen {
                    self.stamp_at_cursor()
                } else {
                    Ok(Outcome::StateOnly)
                }
            }
        }
    }

    fn handle_action(&mut self, action: Action) -> Result<Outcome, EditorError> {
        let cursor = self.state.cursor;
        match action {
            Action::CycleColorUp => self.state.cycle_color_up(),
            Action::CycleColorDown => self.state.cycle_color_down(),
            Action::IncreaseBrush => self.state.grow_brush(),
            Action::DecreaseBrush => self.state.shrink_brush(),
            Action::PickColor => {
                if cursor.on_screen {
                    self.state.color_index = self.buffer.get(cursor.x, cursor.y)?;
                    debug!(color = self.state.color_index, x = cursor.x, y = cursor.y, "picked color");
                }
            }
            Action::Fill => {
                if cursor.on_screen {
                    let filled = fill::flood_fill(&mut self.buffer, cursor.x, cursor.y, self.state.color_index)?;
                    debug!(filled, x = cursor.x, y = cursor.y, color = self.state.color_index, "flood fill");
                    return Ok(Outcome::Painted(filled));
                }
            }
        }
        Ok(Outcome::StateOnly)
    }

    fn stamp_at_cursor(&mut self) -> Result<Outcome, EditorError> {
        let cursor = self.state.cursor;
        let written = brush::stamp(
            &mut self.buffer,
            cursor.x,
            cursor.y,
            self.state.brush_radius,
            self.state.color_index,
        )?;
        Ok(Outcome::Painted(written))
    }
}
