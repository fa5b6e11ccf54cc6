mod replay;
mod terminal;

pub use replay::{replay, ReplayStats};
pub use terminal::{fit_display, translate, Command, TerminalGuard, TerminalSurface};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor::MoveTo, queue};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::editor::{EditorController, EditorState, PixelBuffer, GRID_SIZE};
use crate::input::Action;
use crate::renderer::{FrameClock, Palette, Renderer};
use crate::store::{ArtworkStore, Completion, PersistenceClient};

/// Settings for an interactive editing session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub grid_size: usize,
    /// Fixed display size; None fits the terminal
    pub display_size: Option<usize>,
    pub fps: u32,
    pub background: [u8; 3],
    pub brush_radius: u32,
    pub color_index: u8,
    pub keys: HashMap<char, Action>,
    /// Artwork to load once the session starts
    pub load: Option<String>,
}

impl SessionConfig {
    pub fn from_config(config: &Config, load: Option<String>) -> Result<Self> {
        Ok(Self {
            grid_size: GRID_SIZE,
            display_size: config.display_size.map(|s| s as usize),
            fps: config.fps,
            background: config.background_rgb(),
            brush_radius: config.brush_radius,
            color_index: config.color_index,
            keys: config.keys.actions()?,
            load,
        })
    }
}

/// Interactive terminal editor: input events mutate the editor, a frame clock
/// repaints it, and persistence runs in the background.
pub struct Session {
    config: SessionConfig,
    editor: EditorController,
    renderer: Renderer,
    client: PersistenceClient,
    surface: TerminalSurface,
    status: String,
}

impl Session {
    pub fn new(config: SessionConfig, store: Arc<dyn ArtworkStore>, runtime: Handle) -> Result<Self> {
        let buffer = PixelBuffer::new(config.grid_size, 0)?;
        let state = EditorState::new(config.brush_radius, config.color_index);
        let surface = TerminalSurface::new(config.display_size.unwrap_or(config.grid_size));
        let editor = EditorController::new(buffer, state, surface.display_size() as f64);
        let client = PersistenceClient::new(store, runtime, config.grid_size);
        let renderer = Renderer::new(Palette::default(), config.background);

        Ok(Self {
            config,
            editor,
            renderer,
            client,
            surface,
            status: String::from("Ctrl+S save, Esc quit"),
        })
    }

    /// Run until the user quits
    pub fn run(&mut self) -> Result<()> {
        let (cols, rows) = crossterm::terminal::size().context("Failed to query terminal size")?;
        let _guard = TerminalGuard::enter().context("Failed to set up terminal")?;
        self.resize(cols, rows);

        if let Some(id) = self.config.load.clone() {
            let seq = self.client.load(&id);
            self.status = format!("loading {}...", id);
            info!(seq, id = %id, "loading artwork at startup");
        }

        let mut stdout = io::stdout();
        let mut clock = FrameClock::new(self.config.fps, Instant::now());

        loop {
            for completion in self.client.poll() {
                self.apply(completion);
            }

            let timeout = clock.until_next(Instant::now());
            if event::poll(timeout)? {
                let ev = event::read()?;
                for command in translate(&ev, &self.config.keys, self.surface.display_size()) {
                    match command {
                        Command::Edit(editor_event) => {
                            if let Err(e) = self.editor.handle(editor_event) {
                                debug!("rejected {:?}: {}", editor_event, e);
                            }
                        }
                        Command::Save => {
                            let seq = self.client.save(self.editor.buffer());
                            self.status = format!("saving (#{})...", seq);
                        }
                        Command::Quit => {
                            if self.client.in_flight() > 0 {
                                warn!(pending = self.client.in_flight(), "quitting with persistence requests in flight");
                            }
                            return Ok(());
                        }
                        Command::Resize { cols, rows } => self.resize(cols, rows),
                    }
                }
            }

            if clock.due(Instant::now()) {
                self.renderer.render_frame(&self.editor, &mut self.surface)?;
                self.surface.present(&mut stdout)?;
                self.draw_status(&mut stdout)?;
            }
        }
    }

    fn apply(&mut self, completion: Completion) {
        debug!(seq = completion.seq(), "persistence request finished");
        match completion {
            Completion::Saved { id, .. } => self.status = format!("saved {}", id),
            Completion::Loaded { id, buffer, .. } => match self.editor.replace_buffer(buffer) {
                Ok(()) => self.status = format!("loaded {}", id),
                Err(e) => {
                    warn!(id = %id, "cannot use loaded artwork: {}", e);
                    self.status = format!("load failed: {}", e);
                }
            },
            Completion::Failed { error, .. } => self.status = format!("error: {}", error),
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let fit = fit_display(cols, rows);
        let size = self.config.display_size.map_or(fit, |s| s.min(fit));
        self.surface.resize(size);
        self.editor.set_display_size(size as f64);
        debug!(cols, rows, display = size, "display resized");
    }

    fn draw_status(&self, out: &mut impl Write) -> io::Result<()> {
        let state = self.editor.state();
        let [r, g, b] = self
            .renderer
            .palette()
            .color_at(state.color_index)
            .unwrap_or([255, 255, 255]);
        let cursor = if state.cursor.on_screen {
            format!("{},{}", state.cursor.x, state.cursor.y)
        } else {
            "-".to_string()
        };

        queue!(
            out,
            MoveTo(0, self.surface.rows()),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Rgb { r, g, b }),
            Print("██"),
            ResetColor,
            Print(format!(
                " color {:>2}  radius {:>2}  cursor {}  {}",
                state.color_index, state.brush_radius, cursor, self.status
            )),
        )?;
        out.flush()
    }
}
