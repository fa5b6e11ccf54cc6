mod canvas;
mod colors;

pub use canvas::Canvas;
pub use colors::{Palette, Rgb, PALETTE_SIZE};

use crate::editor::{brush, EditorController, PixelBuffer};
use crate::error::EditorError;
use std::time::{Duration, Instant};

/// A rectangular drawing target in logical display units
pub trait Surface {
    fn size(&self) -> (usize, usize);
    fn clear(&mut self, rgb: Rgb);
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, rgb: Rgb);
}

/// Repaints a surface from editor state. Reads state, never mutates it.
pub struct Renderer {
    palette: Palette,
    background: Rgb,
}

impl Renderer {
    pub fn new(palette: Palette, background: Rgb) -> Self {
        Self { palette, background }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// One frame: clear, draw every cell, then the brush preview when the cursor is on screen
    pub fn render_frame(&self, editor: &EditorController, surface: &mut impl Surface) -> Result<(), EditorError> {
        self.render_buffer(editor.buffer(), surface)?;

        let state = editor.state();
        if state.cursor.on_screen {
            let size = editor.buffer().size();
            let preview = self.palette.color_at(state.color_index)?;
            for (x, y) in brush::footprint(state.cursor.x as i64, state.cursor.y as i64, state.brush_radius, size) {
                fill_cell(surface, size, x, y, preview);
            }
        }

        Ok(())
    }

    /// Clear and draw the buffer without any cursor overlay
    pub fn render_buffer(&self, buffer: &PixelBuffer, surface: &mut impl Surface) -> Result<(), EditorError> {
        surface.clear(self.background);

        let size = buffer.size();
        for y in 0..size {
            for x in 0..size {
                let rgb = self.palette.color_at(buffer.get(x, y)?)?;
                fill_cell(surface, size, x, y, rgb);
            }
        }

        Ok(())
    }
}

/// Display span `[start, end)` of cell `i` on an axis of `extent` units split into `cells` cells
fn span(i: usize, cells: usize, extent: usize) -> (usize, usize) {
    (i * extent / cells, (i + 1) * extent / cells)
}

fn fill_cell(surface: &mut impl Surface, size: usize, x: usize, y: usize, rgb: Rgb) {
    let (width, height) = surface.size();
    let (x0, x1) = span(x, size, width);
    let (y0, y1) = span(y, size, height);
    // Downsampled displays drop cells whose span is empty
    if x1 > x0 && y1 > y0 {
        surface.fill_rect(x0, y0, x1 - x0, y1 - y0, rgb);
    }
}

/// Fixed-interval frame scheduler. `due` never blocks; the caller polls it.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(fps: u32, now: Instant) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.clamp(1, 120) as f64),
            next: now,
        }
    }

    /// True when a frame should be drawn at `now`; schedules the following one.
    /// Missed frames are skipped rather than replayed.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }

    /// Time left until the next frame, zero if one is already due
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorState;
    use crate::input::EditorEvent;

    const WHITE: Rgb = [255, 255, 255];

    fn editor(size: usize) -> EditorController {
        EditorController::new(PixelBuffer::new(size, 0).unwrap(), EditorState::new(1, 8), size as f64)
    }

    #[test]
    fn frame_draws_cells_scaled_to_surface() {
        let mut editor = editor(4);
        editor.handle(EditorEvent::PointerMove { x: 3.0, y: 3.0, primary: true }).unwrap();
        editor.handle(EditorEvent::PointerLeave).unwrap();

        let renderer = Renderer::new(Palette::default(), WHITE);
        let mut canvas = Canvas::new(8, 8);
        renderer.render_frame(&editor, &mut canvas).unwrap();

        let red = Palette::default().color_at(8).unwrap();
        let black = Palette::default().color_at(0).unwrap();
        assert_eq!(canvas.get_pixel(7, 7), Some(red));
        assert_eq!(canvas.get_pixel(4, 4), Some(red));
        assert_eq!(canvas.get_pixel(3, 3), Some(black));
    }

    #[test]
    fn preview_is_drawn_without_touching_buffer() {
        let mut editor = editor(4);
        editor.handle(EditorEvent::PointerMove { x: 1.0, y: 1.0, primary: false }).unwrap();

        let renderer = Renderer::new(Palette::default(), WHITE);
        let mut canvas = Canvas::new(4, 4);
        renderer.render_frame(&editor, &mut canvas).unwrap();

        let red = Palette::default().color_at(8).unwrap();
        assert_eq!(canvas.get_pixel(0, 0), Some(red));
        assert_eq!(canvas.get_pixel(1, 1), Some(red));
        assert_eq!(canvas.get_pixel(2, 2), Some([0, 0, 0]));
        assert!(editor.buffer().cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn rendering_is_repeatable() {
        let editor = editor(4);
        let renderer = Renderer::new(Palette::default(), WHITE);
        let mut first = Canvas::new(6, 6);
        let mut second = Canvas::new(6, 6);
        renderer.render_frame(&editor, &mut first).unwrap();
        renderer.render_frame(&editor, &mut first).unwrap();
        renderer.render_frame(&editor, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn downsampled_surface_skips_empty_spans() {
        assert_eq!(span(0, 4, 2), (0, 0));
        assert_eq!(span(1, 4, 2), (0, 1));
        assert_eq!(span(3, 4, 2), (1, 2));

        let renderer = Renderer::new(Palette::default(), WHITE);
        let mut canvas = Canvas::new(2, 2);
        renderer.render_buffer(&PixelBuffer::new(4, 12).unwrap(), &mut canvas).unwrap();
        let blue = Palette::default().color_at(12).unwrap();
        assert!(canvas.data().chunks(3).all(|px| px == blue));
    }

    #[test]
    fn frame_clock_ticks_at_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::new(10, start);
        assert!(clock.due(start));
        assert!(!clock.due(start + Duration::from_millis(50)));
        assert!(clock.due(start + Duration::from_millis(100)));
        // A long stall yields one frame, not a burst
        assert!(clock.due(start + Duration::from_secs(5)));
        assert!(!clock.due(start + Duration::from_secs(5)));
        assert_eq!(clock.until_next(start + Duration::from_secs(5)), Duration::from_millis(100));
    }
}
