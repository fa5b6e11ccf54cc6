use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::editor::brush::{MAX_RADIUS, MIN_RADIUS};
use crate::input::Action;
use crate::renderer::{Palette, Rgb, PALETTE_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_brush_radius")]
    pub brush_radius: u32,

    #[serde(default = "default_color_index")]
    pub color_index: u8,

    /// Square display size in logical units (None = fit the terminal)
    #[serde(default)]
    pub display_size: Option<u32>,

    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Surface clear color as `#RRGGBB`
    #[serde(default = "default_background")]
    pub background: String,

    /// Artwork store directory
    #[serde(default)]
    pub store: Option<PathBuf>,

    #[serde(default)]
    pub keys: KeyMap,
}

fn default_brush_radius() -> u32 {
    2
}

fn default_color_index() -> u8 {
    4
}

fn default_fps() -> u32 {
    30
}

fn default_background() -> String {
    "#FFFFFF".to_string()
}

/// One key per editor action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMap {
    #[serde(default = "default_cycle_up")]
    pub cycle_color_up: char,
    #[serde(default = "default_cycle_down")]
    pub cycle_color_down: char,
    #[serde(default = "default_increase")]
    pub increase_brush: char,
    #[serde(default = "default_decrease")]
    pub decrease_brush: char,
    #[serde(default = "default_pick")]
    pub pick_color: char,
    #[serde(default = "default_fill")]
    pub fill: char,
}

fn default_cycle_up() -> char {
    'd'
}

fn default_cycle_down() -> char {
    'a'
}

fn default_increase() -> char {
    'w'
}

fn default_decrease() -> char {
    's'
}

fn default_pick() -> char {
    'e'
}

fn default_fill() -> char {
    'q'
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            cycle_color_up: default_cycle_up(),
            cycle_color_down: default_cycle_down(),
            increase_brush: default_increase(),
            decrease_brush: default_decrease(),
            pick_color: default_pick(),
            fill: default_fill(),
        }
    }
}

impl KeyMap {
    fn bindings(&self) -> [(char, Action); 6] {
        [
            (self.cycle_color_up, Action::CycleColorUp),
            (self.cycle_color_down, Action::CycleColorDown),
            (self.increase_brush, Action::IncreaseBrush),
            (self.decrease_brush, Action::DecreaseBrush),
            (self.pick_color, Action::PickColor),
            (self.fill, Action::Fill),
        ]
    }

    /// Lookup table from key to action; fails on a key bound twice
    pub fn actions(&self) -> Result<HashMap<char, Action>> {
        let mut table = HashMap::new();
        for (key, action) in self.bindings() {
            if let Some(previous) = table.insert(key, action) {
                anyhow::bail!("Key '{}' is bound to both {:?} and {:?}", key, previous, action);
            }
        }
        Ok(table)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brush_radius: default_brush_radius(),
            color_index: default_color_index(),
            display_size: None,
            fps: default_fps(),
            background: default_background(),
            store: None,
            keys: KeyMap::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config YAML: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path, else the first config found on the search path, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for path in Self::search_paths() {
            if path.is_file() {
                return Self::load(&path);
            }
        }

        Ok(Self::default())
    }

    /// Config search paths in order of priority
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("pixart.yaml")];

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pixart") {
            paths.push(proj_dirs.config_dir().join("config.yaml"));
        }

        paths
    }

    fn validate(&mut self) -> Result<()> {
        self.brush_radius = self.brush_radius.clamp(MIN_RADIUS, MAX_RADIUS);

        if self.color_index as usize >= PALETTE_SIZE {
            anyhow::bail!("color_index {} is outside 0..{}", self.color_index, PALETTE_SIZE);
        }
        if self.display_size == Some(0) {
            anyhow::bail!("display_size must be positive");
        }
        if !(1..=120).contains(&self.fps) {
            anyhow::bail!("fps must be between 1 and 120, got {}", self.fps);
        }
        if Palette::parse_hex(&self.background).is_none() {
            anyhow::bail!("background '{}' is not a #RRGGBB color", self.background);
        }
        self.keys.actions()?;

        Ok(())
    }

    pub fn background_rgb(&self) -> Rgb {
        Palette::parse_hex(&self.background).unwrap_or([255, 255, 255])
    }

    /// Store directory: explicit flag, else config, else `./art` if present, else the user data dir
    pub fn store_dir(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Some(ref path) = self.store {
            return path.clone();
        }

        let local = PathBuf::from("art");
        if local.is_dir() {
            return local;
        }

        directories::ProjectDirs::from("", "", "pixart")
            .map(|dirs| dirs.data_dir().join("art"))
            .unwrap_or(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.brush_radius, 2);
        assert_eq!(config.color_index, 4);
        assert_eq!(config.fps, 30);
        assert_eq!(config.background_rgb(), [255, 255, 255]);
        assert_eq!(config.keys.actions().unwrap()[&'q'], Action::Fill);
    }

    #[test]
    fn radius_is_clamped() {
        let config = Config::from_yaml("brush_radius: 90").unwrap();
        assert_eq!(config.brush_radius, 50);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_yaml("color_index: 16").is_err());
        assert!(Config::from_yaml("fps: 0").is_err());
        assert!(Config::from_yaml("background: white").is_err());
        assert!(Config::from_yaml("display_size: 0").is_err());
    }

    #[test]
    fn rejects_duplicate_key_bindings() {
        let err = Config::from_yaml("keys:\n  fill: d\n").unwrap_err();
        assert!(err.to_string().contains("'d'"));
    }

    #[test]
    fn custom_bindings_are_honored() {
        let config = Config::from_yaml("keys:\n  fill: f\n  pick_color: p\n").unwrap();
        let actions = config.keys.actions().unwrap();
        assert_eq!(actions[&'f'], Action::Fill);
        assert_eq!(actions[&'p'], Action::PickColor);
        assert!(!actions.contains_key(&'q'));
    }

    #[test]
    fn explicit_store_wins() {
        let config = Config::from_yaml("store: /tmp/elsewhere").unwrap();
        assert_eq!(config.store_dir(Some(Path::new("mine"))), PathBuf::from("mine"));
        assert_eq!(config.store_dir(None), PathBuf::from("/tmp/elsewhere"));
    }
}
