//! Pixel-art editor engine: a fixed-size grid of palette indices, a disc
//! brush, 4-connected flood fill, and the controller that applies input
//! events to them. Rendering, persistence and the terminal front end sit on
//! top of that engine.

pub mod cli;
pub mod config;
pub mod editor;
pub mod encoder;
pub mod error;
pub mod input;
pub mod renderer;
pub mod session;
pub mod store;

pub use editor::{EditorController, EditorState, PixelBuffer, GRID_SIZE};
pub use error::{EditorError, StoreError};
pub use input::{Action, EditorEvent};
pub use renderer::{Palette, Renderer};
