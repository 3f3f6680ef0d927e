use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::easing::Easing;
use crate::host::Device;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Engine defaults applied when an option is left unset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Frames per second for the real-time ticker
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Viewport fraction where element triggers start (0 = top, 1 = bottom)
    #[serde(default = "default_start_trigger")]
    pub start_trigger: f64,
    /// Viewport fraction where element triggers end
    #[serde(default = "default_end_trigger")]
    pub end_trigger: f64,
    /// Timeline scrub smoothing (0 = no smoothing)
    #[serde(default = "default_scrub_smoothness")]
    pub scrub_smoothness: f64,
    /// Scroll velocity (px/frame) under which horizontal sections snap
    #[serde(default = "default_snap_velocity_threshold")]
    pub snap_velocity_threshold: f64,
    /// Minimum progress distance worth snapping across
    #[serde(default = "default_snap_tolerance")]
    pub snap_tolerance: f64,
    /// Distance at which a scrubbed timeline counts as settled
    #[serde(default = "default_settle_epsilon")]
    pub settle_epsilon: f64,
    /// Default smooth scroll duration in milliseconds
    #[serde(default = "default_scroll_to_duration")]
    pub scroll_to_duration_ms: f64,
    /// Default smooth scroll easing
    #[serde(default = "default_scroll_to_easing")]
    pub scroll_to_easing: Easing,
    /// Lower bound for the page-progress scroll range, in pixels
    #[serde(default = "default_min_scroll_range")]
    pub min_scroll_range: f64,
    /// Device class reported to effects with per-device switches
    #[serde(default)]
    pub device: Device,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            start_trigger: default_start_trigger(),
            end_trigger: default_end_trigger(),
            scrub_smoothness: default_scrub_smoothness(),
            snap_velocity_threshold: default_snap_velocity_threshold(),
            snap_tolerance: default_snap_tolerance(),
            settle_epsilon: default_settle_epsilon(),
            scroll_to_duration_ms: default_scroll_to_duration(),
            scroll_to_easing: default_scroll_to_easing(),
            min_scroll_range: default_min_scroll_range(),
            device: Device::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Input poll interval in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Pixels scrolled per line step
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,
    /// Duration of keyboard-driven smooth scrolls in milliseconds
    #[serde(default = "default_scroll_duration")]
    pub scroll_duration_ms: f64,
    /// Number of lines kept in the event log
    #[serde(default = "default_event_log_size")]
    pub event_log_size: usize,
    /// Color theme of the viewer: `gruvbox`, `nord` or `dracula`
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            scroll_step: default_scroll_step(),
            scroll_duration_ms: default_scroll_duration(),
            event_log_size: default_event_log_size(),
            theme: default_theme(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-d>" (Ctrl+d), "<S-Tab>" (Shift+Tab), "<CR>" (Enter), "<Space>", "gg"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the viewer
    #[serde(default = "default_key_quit")]
    pub quit: String,

    // Scrolling
    /// Scroll down one step
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    /// Scroll up one step
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    /// Scroll half a viewport down
    #[serde(default = "default_key_scroll_half_down")]
    pub scroll_half_down: String,
    /// Scroll half a viewport up
    #[serde(default = "default_key_scroll_half_up")]
    pub scroll_half_up: String,
    /// Scroll a full viewport down
    #[serde(default = "default_key_scroll_page_down")]
    pub scroll_page_down: String,
    /// Scroll a full viewport up
    #[serde(default = "default_key_scroll_page_up")]
    pub scroll_page_up: String,
    /// Jump to the top of the document
    #[serde(default = "default_key_jump_to_top")]
    pub jump_to_top: String,
    /// Jump to the bottom of the document
    #[serde(default = "default_key_jump_to_bottom")]
    pub jump_to_bottom: String,

    // Triggers
    /// Focus next trigger
    #[serde(default = "default_key_next_trigger")]
    pub next_trigger: String,
    /// Focus previous trigger
    #[serde(default = "default_key_prev_trigger")]
    pub prev_trigger: String,
    /// Smooth-scroll to the start of the focused trigger
    #[serde(default = "default_key_scroll_to_trigger")]
    pub scroll_to_trigger: String,

    // Playback
    /// Pause or resume the frame loop
    #[serde(default = "default_key_toggle_pause")]
    pub toggle_pause: String,
    /// Advance a single frame while paused
    #[serde(default = "default_key_step_frame")]
    pub step_frame: String,
    /// Play the scenario's scripted scroll offsets
    #[serde(default = "default_key_play_script")]
    pub play_script: String,
    /// Re-query element geometry
    #[serde(default = "default_key_refresh")]
    pub refresh: String,
    /// Clear the event log
    #[serde(default = "default_key_clear_log")]
    pub clear_log: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            scroll_half_down: default_key_scroll_half_down(),
            scroll_half_up: default_key_scroll_half_up(),
            scroll_page_down: default_key_scroll_page_down(),
            scroll_page_up: default_key_scroll_page_up(),
            jump_to_top: default_key_jump_to_top(),
            jump_to_bottom: default_key_jump_to_bottom(),
            next_trigger: default_key_next_trigger(),
            prev_trigger: default_key_prev_trigger(),
            scroll_to_trigger: default_key_scroll_to_trigger(),
            toggle_pause: default_key_toggle_pause(),
            step_frame: default_key_step_frame(),
            play_script: default_key_play_script(),
            refresh: default_key_refresh(),
            clear_log: default_key_clear_log(),
        }
    }
}

// Default keymap values (Vim-style notation)
fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_scroll_half_down() -> String { "<C-d>".to_string() }
fn default_key_scroll_half_up() -> String { "<C-u>".to_string() }
fn default_key_scroll_page_down() -> String { "<C-f>".to_string() }
fn default_key_scroll_page_up() -> String { "<C-b>".to_string() }
fn default_key_jump_to_top() -> String { "gg".to_string() }
fn default_key_jump_to_bottom() -> String { "G".to_string() }
fn default_key_next_trigger() -> String { "<Tab>".to_string() }
fn default_key_prev_trigger() -> String { "<S-Tab>".to_string() }
fn default_key_scroll_to_trigger() -> String { "<CR>".to_string() }
fn default_key_toggle_pause() -> String { "<Space>".to_string() }
fn default_key_step_frame() -> String { "n".to_string() }
fn default_key_play_script() -> String { "p".to_string() }
fn default_key_refresh() -> String { "r".to_string() }
fn default_key_clear_log() -> String { "c".to_string() }

fn default_log_level() -> String {
    "info".to_string()
}

fn default_frame_rate() -> u32 {
    60
}

fn default_start_trigger() -> f64 {
    0.8
}

fn default_end_trigger() -> f64 {
    0.2
}

fn default_scrub_smoothness() -> f64 {
    0.5
}

fn default_snap_velocity_threshold() -> f64 {
    0.1
}

fn default_snap_tolerance() -> f64 {
    0.01
}

fn default_settle_epsilon() -> f64 {
    1e-4
}

fn default_scroll_to_duration() -> f64 {
    1000.0
}

fn default_scroll_to_easing() -> Easing {
    Easing::EaseInOutQuad
}

fn default_min_scroll_range() -> f64 {
    10.0
}

fn default_tick_rate() -> u64 {
    16
}

fn default_scroll_step() -> f64 {
    40.0
}

fn default_scroll_duration() -> f64 {
    150.0
}

fn default_event_log_size() -> usize {
    200
}

fn default_theme() -> String {
    "gruvbox".to_string()
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path or return defaults if it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollfx/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollfx")
            .join("config.toml")
    }
}
