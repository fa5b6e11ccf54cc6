use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event, KeyCode,
    KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::collections::HashMap;
use std::io::{self, Write};

use crate::input::{Action, EditorEvent};
use crate::renderer::{Canvas, Rgb, Surface};

/// Puts the terminal in raw/alternate-screen/mouse mode and restores it on drop
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, Show, DisableFocusChange, DisableMouseCapture, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Square drawing area of `size` logical pixels. Each terminal cell shows two
/// stacked pixels with an upper half block.
pub struct TerminalSurface {
    canvas: Canvas,
    presented: Option<Canvas>,
}

impl TerminalSurface {
    pub fn new(size: usize) -> Self {
        Self {
            canvas: Canvas::new(size, size),
            presented: None,
        }
    }

    pub fn display_size(&self) -> usize {
        self.canvas.width()
    }

    /// Terminal rows taken by the drawing area
    pub fn rows(&self) -> u16 {
        self.canvas.height().div_ceil(2) as u16
    }

    pub fn resize(&mut self, size: usize) {
        self.canvas = Canvas::new(size, size);
        self.presented = None;
    }

    /// Draw cells that changed since the last present
    pub fn present(&mut self, out: &mut impl Write) -> io::Result<()> {
        let (width, height) = (self.canvas.width(), self.canvas.height());

        for row in 0..height.div_ceil(2) {
            let (top_y, bottom_y) = (row * 2, row * 2 + 1);
            for col in 0..width {
                let top = self.canvas.get_pixel(col, top_y);
                let bottom = self.canvas.get_pixel(col, bottom_y);

                if let Some(ref prev) = self.presented {
                    if prev.get_pixel(col, top_y) == top && prev.get_pixel(col, bottom_y) == bottom {
                        continue;
                    }
                }

                queue!(out, MoveTo(col as u16, row as u16))?;
                if let Some(rgb) = top {
                    queue!(out, SetForegroundColor(color(rgb)))?;
                }
                match bottom {
                    Some(rgb) => queue!(out, SetBackgroundColor(color(rgb)))?,
                    None => queue!(out, SetBackgroundColor(Color::Reset))?,
                }
                queue!(out, Print('▀'))?;
            }
        }

        queue!(out, ResetColor)?;
        out.flush()?;
        self.presented = Some(self.canvas.clone());
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> (usize, usize) {
        self.canvas.size()
    }

    fn clear(&mut self, rgb: Rgb) {
        self.canvas.clear(rgb);
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, rgb: Rgb) {
        self.canvas.fill_rect(x, y, w, h, rgb);
    }
}

fn color([r, g, b]: Rgb) -> Color {
    Color::Rgb { r, g, b }
}

/// Largest square display that fits a terminal of `cols`x`rows`, keeping one row for status
pub fn fit_display(cols: u16, rows: u16) -> usize {
    let by_width = cols as usize;
    let by_height = rows.saturating_sub(1) as usize * 2;
    by_width.min(by_height).max(1)
}

/// What a terminal event asks the session to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Edit(EditorEvent),
    Save,
    Quit,
    Resize { cols: u16, rows: u16 },
}

/// Translate a crossterm event. Pointer positions become logical display units
/// at the center of the terminal cell; positions outside the drawing area are
/// reported as the pointer leaving it.
pub fn translate(event: &Event, keys: &HashMap<char, Action>, display_size: usize) -> Vec<Command> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Esc => vec![Command::Quit],
                KeyCode::Char('c') if ctrl => vec![Command::Quit],
                KeyCode::Char('s') if ctrl => vec![Command::Save],
                KeyCode::Char(c) if !ctrl => keys
                    .get(&c)
                    .map(|&action| vec![Command::Edit(EditorEvent::key(action))])
                    .unwrap_or_default(),
                _ => Vec::new(),
            }
        }
        Event::Mouse(mouse) => {
            let x = mouse.column as f64 + 0.5;
            let y = mouse.row as f64 * 2.0 + 1.0;
            let inside = x < display_size as f64 && y < display_size as f64;
            let to = |primary: bool| {
                if inside {
                    Command::Edit(EditorEvent::PointerMove { x, y, primary })
                } else {
                    Command::Edit(EditorEvent::PointerLeave)
                }
            };

            match mouse.kind {
                MouseEventKind::Moved => vec![to(false)],
                MouseEventKind::Drag(MouseButton::Left) => vec![to(true)],
                MouseEventKind::Down(MouseButton::Left) if inside => {
                    vec![to(false), Command::Edit(EditorEvent::PointerPress)]
                }
                MouseEventKind::Down(MouseButton::Left) => vec![to(false)],
                _ => Vec::new(),
            }
        }
        Event::FocusLost => vec![Command::Edit(EditorEvent::PointerLeave)],
        Event::Resize(cols, rows) => vec![Command::Resize {
            cols: *cols,
            rows: *rows,
        }],
        _ => Vec::new(),
    }
}
