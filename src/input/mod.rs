use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Editor commands bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CycleColorUp,
    CycleColorDown,
    IncreaseBrush,
    DecreaseBrush,
    PickColor,
    Fill,
}

/// Discrete input delivered to the controller. Pointer coordinates are in
/// logical display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    Key { action: Action },
    #[serde(rename = "move")]
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        primary: bool,
    },
    #[serde(rename = "press")]
    PointerPress,
    #[serde(rename = "leave")]
    PointerLeave,
}

impl EditorEvent {
    pub fn key(action: Action) -> Self {
        EditorEvent::Key { action }
    }
}

#[derive(Debug, Clone)]
pub struct Metadata {
    pub display_size: f64,
}

pub trait InputSource {
    fn read_events(&mut self) -> Result<Vec<EditorEvent>>;
    fn metadata(&self) -> Metadata;
}

#[derive(Debug, Deserialize)]
struct ScriptHeader {
    version: u32,
    display_size: f64,
}

/// JSON-lines event script: a header line followed by one event per line
pub struct ScriptReader {
    header: ScriptHeader,
    events: Vec<EditorEvent>,
}

impl ScriptReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open event script: {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut lines = reader.lines().enumerate();

        let header_line = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => anyhow::bail!("Empty event script"),
            }
        };
        let header: ScriptHeader =
            serde_json::from_str(&header_line).context("Invalid event script header")?;
        if header.version != 1 {
            anyhow::bail!("Unsupported event script version {}", header.version);
        }
        if !(header.display_size.is_finite() && header.display_size > 0.0) {
            anyhow::bail!("Event script display_size must be positive, got {}", header.display_size);
        }

        let mut events = Vec::new();
        for (number, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: EditorEvent = serde_json::from_str(&line)
                .with_context(|| format!("Invalid event on line {}", number + 1))?;
            events.push(event);
        }

        Ok(Self { header, events })
    }
}

impl InputSource for ScriptReader {
    fn read_events(&mut self) -> Result<Vec<EditorEvent>> {
        Ok(self.events.clone())
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            display_size: self.header.display_size,
        }
    }
}
