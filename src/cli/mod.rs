use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixart")]
#[command(version)]
#[command(about = "Paint 128x128 pixel art in the terminal with a fixed 16-color palette", long_about = None)]
pub struct Args {
    /// Config file (YAML); defaults to ./pixart.yaml or the user config dir
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Artwork store directory
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Write logs to this file (the interactive editor never logs to the terminal)
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the interactive editor
    Edit {
        /// Saved artwork to load
        id: Option<String>,
    },

    /// List saved artworks
    List,

    /// Render a saved artwork to an image
    Export {
        /// Artwork id
        id: String,

        /// Output image (.gif or .png)
        #[arg(short, long)]
        output: PathBuf,

        /// Display pixels per grid cell (1-32)
        #[arg(long, default_value = "4")]
        scale: usize,

        /// Output format (gif, png); overrides the file extension
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,
    },

    /// Apply a scripted event stream without a terminal
    Replay {
        /// JSON-lines event script
        script: PathBuf,

        /// Start from this saved artwork instead of a blank grid
        #[arg(long)]
        base: Option<String>,

        /// Save the result to the store
        #[arg(long)]
        save: bool,

        /// Write an animated GIF of the replay
        #[arg(long)]
        gif: Option<PathBuf>,

        /// Frames per second of the GIF (1-100)
        #[arg(long, default_value = "10")]
        fps: u32,

        /// Events per GIF frame
        #[arg(long, default_value = "1")]
        every: usize,

        /// Display pixels per grid cell in the GIF (1-32)
        #[arg(long, default_value = "2")]
        scale: usize,
    },
}
