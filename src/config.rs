use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::timeline::DEFAULT_FRAME_RATE;
use crate::types::{CanvasSize, StrokeSettings};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub canvas: CanvasSize,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Settings new strokes start with when a script does not say otherwise.
    #[serde(default)]
    pub stroke: StrokeSettings,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub key_bindings: KeyBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Frame count used when a request leaves it out.
    #[serde(default = "default_generate_count")]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_play_pause")]
    pub play_pause: String,
    #[serde(default = "default_faster")]
    pub faster: String,
    #[serde(default = "default_slower")]
    pub slower: String,
    #[serde(default = "default_next_frame")]
    pub next_frame: String,
    #[serde(default = "default_prev_frame")]
    pub prev_frame: String,
    #[serde(default = "default_quit")]
    pub quit: String,
}

fn default_frame_rate() -> u32 { DEFAULT_FRAME_RATE }
fn default_frame_delay_ms() -> u64 { 100 }
fn default_output() -> PathBuf { PathBuf::from("exported.gif") }
fn default_generate_count() -> usize { 24 }
fn default_play_pause() -> String { "Space".into() }
fn default_faster() -> String { "+".into() }
fn default_slower() -> String { "-".into() }
fn default_next_frame() -> String { "Right".into() }
fn default_prev_frame() -> String { "Left".into() }
fn default_quit() -> String { "q".into() }

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            canvas: CanvasSize::default(),
            frame_rate: default_frame_rate(),
            stroke: StrokeSettings::default(),
            export: ExportConfig::default(),
            generate: GenerateConfig::default(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            frame_delay_ms: default_frame_delay_ms(),
            output: default_output(),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            count: default_generate_count(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            play_pause: default_play_pause(),
            faster: default_faster(),
            slower: default_slower(),
            next_frame: default_next_frame(),
            prev_frame: default_prev_frame(),
            quit: default_quit(),
        }
    }
}

impl ExportConfig {
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

impl AppConfig {
    /// Load the user config, falling back to defaults if it is missing or bad.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("invalid config {} ({e}), using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("flipbook");
        path.push("config.json");
        path
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(ch) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return match ch.chars().next() {
            Some(c) => event.code == KeyCode::Char(c),
            None => false,
        };
    }

    // Plain bindings must not fire on Ctrl/Alt chords.
    if event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::ALT)
    {
        return false;
    }

    match binding {
        "Right" => event.code == KeyCode::Right,
        "Left" => event.code == KeyCode::Left,
        "Up" => event.code == KeyCode::Up,
        "Down" => event.code == KeyCode::Down,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        s => match s.chars().next() {
            Some(c) => event.code == KeyCode::Char(c),
            None => false,
        },
    }
}
