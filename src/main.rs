use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pixart::cli::{self, Command};
use pixart::config::Config;
use pixart::editor::{EditorController, EditorState, PixelBuffer, GRID_SIZE};
use pixart::encoder::{self, AnimatedEncoder, GifEncoder, OutputFormat};
use pixart::input::{InputSource, ScriptReader};
use pixart::renderer::{Canvas, Palette, Renderer};
use pixart::session::{self, Session, SessionConfig};
use pixart::store::{ArtworkStore, Completion, DirStore, PersistenceClient};

fn init_logging(verbose: u8, log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("pixart={}", level)));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // The editor owns the terminal; stderr output would corrupt the screen
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = cli::Args::parse();
    let interactive = matches!(args.command, Command::Edit { .. });
    init_logging(args.verbose, args.log.as_deref(), interactive)?;

    let config = Config::discover(args.config.as_deref())?;
    let store_dir = config.store_dir(args.store.as_deref());
    info!(store = %store_dir.display(), "using artwork store");
    let store: Arc<dyn ArtworkStore> = Arc::new(DirStore::new(store_dir, GRID_SIZE));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    match args.command {
        Command::Edit { id } => {
            let session_config = SessionConfig::from_config(&config, id)?;
            let mut session = Session::new(session_config, store, runtime.handle().clone())?;
            session.run()?;
        }
        Command::List => list_artworks(&runtime, store.as_ref())?,
        Command::Export { id, output, scale, format } => {
            export_artwork(&runtime, store.as_ref(), &config, &id, &output, scale, format.as_deref())?;
        }
        Command::Replay { script, base, save, gif, fps, every, scale } => {
            let options = ReplayOptions { base, save, gif, fps, every, scale };
            replay_script(&runtime, store, &config, &script, options)?;
        }
    }

    Ok(())
}

fn list_artworks(runtime: &tokio::runtime::Runtime, store: &dyn ArtworkStore) -> Result<()> {
    let mut records = runtime.block_on(store.list())?;
    records.sort_by(|a, b| a.uuid.cmp(&b.uuid));

    if records.is_empty() {
        println!("No saved artworks");
        return Ok(());
    }

    for record in &records {
        let painted = record.pixels.iter().filter(|&&p| p != 0).count();
        println!("{}  {:>5} painted cells", record.uuid, painted);
    }
    println!("\nTotal: {} artworks", records.len());

    Ok(())
}

fn check_scale(scale: usize) -> Result<usize> {
    if !(1..=32).contains(&scale) {
        anyhow::bail!("Scale must be between 1 and 32, got {}", scale);
    }
    Ok(scale)
}

fn output_format(path: &Path, explicit: Option<&str>) -> Result<OutputFormat> {
    let detected = OutputFormat::from_path(path);

    let Some(name) = explicit else {
        return Ok(detected.unwrap_or(OutputFormat::Gif));
    };

    let format = OutputFormat::from_name(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown format: {}. Supported formats: gif, png", name))?;
    if let Some(detected) = detected {
        if detected != format {
            eprintln!(
                "Warning: format '{:?}' doesn't match output extension '.{}', using {:?}",
                format,
                detected.extension(),
                format
            );
        }
    }
    Ok(format)
}

fn export_artwork(
    runtime: &tokio::runtime::Runtime,
    store: &dyn ArtworkStore,
    config: &Config,
    id: &str,
    output: &Path,
    scale: usize,
    format: Option<&str>,
) -> Result<()> {
    let scale = check_scale(scale)?;
    let format = output_format(output, format)?;

    let record = runtime.block_on(store.get(id))?;
    let buffer = record.to_buffer(GRID_SIZE)?;

    let side = GRID_SIZE * scale;
    let renderer = Renderer::new(Palette::default(), config.background_rgb());
    let mut canvas = Canvas::new(side, side);
    renderer.render_buffer(&buffer, &mut canvas)?;

    encoder::write_still(output, format, &canvas, renderer.palette())?;
    println!("✓ {:?} created: {} ({}x{})", format, output.display(), side, side);

    Ok(())
}

struct ReplayOptions {
    base: Option<String>,
    save: bool,
    gif: Option<PathBuf>,
    fps: u32,
    every: usize,
    scale: usize,
}

fn replay_script(
    runtime: &tokio::runtime::Runtime,
    store: Arc<dyn ArtworkStore>,
    config: &Config,
    script: &Path,
    options: ReplayOptions,
) -> Result<()> {
    let scale = check_scale(options.scale)?;
    let mut reader = ScriptReader::new(script)?;
    let events = reader.read_events()?;
    let display_size = reader.metadata().display_size;

    let buffer = match options.base {
        Some(ref id) => runtime.block_on(store.get(id))?.to_buffer(GRID_SIZE)?,
        None => PixelBuffer::new(GRID_SIZE, 0)?,
    };
    let state = EditorState::new(config.brush_radius, config.color_index);
    let mut editor = EditorController::new(buffer, state, display_size);

    println!(" - script: {}", script.display());
    println!(" - events: {}", events.len());
    println!(" - display size: {}", display_size);

    let stats = match options.gif {
        Some(ref path) => {
            let fps = options.fps.clamp(1, 100);
            let delay_centiseconds = (100.0 / fps as f64).round() as u16;
            let side = GRID_SIZE * scale;
            let renderer = Renderer::new(Palette::default(), config.background_rgb());
            let mut canvas = Canvas::new(side, side);
            let mut gif = GifEncoder::create(path, side, side, renderer.palette(), 0)?;

            let stats = session::replay(&mut editor, &events, options.every, |editor| {
                renderer.render_frame(editor, &mut canvas)?;
                gif.add_frame(&canvas, delay_centiseconds)
            })?;
            gif.finish()?;
            println!(" - gif: {} ({} frames)", path.display(), stats.frames);
            stats
        }
        None => session::replay(&mut editor, &events, options.every, |_| Ok(()))?,
    };

    println!(
        " - applied: {}, rejected: {}, cells painted: {}",
        stats.applied, stats.rejected, stats.cells_painted
    );

    if options.save {
        let mut client = PersistenceClient::new(store, runtime.handle().clone(), GRID_SIZE);
        client.save(editor.buffer());
        match runtime.block_on(client.next_completion()) {
            Some(Completion::Saved { id, .. }) => println!("✓ saved {}", id),
            Some(Completion::Failed { error, .. }) => return Err(error.into()),
            other => anyhow::bail!("Unexpected persistence result: {:?}", other),
        }
    }

    Ok(())
}
