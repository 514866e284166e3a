// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[workspace]` - Resolution, zoom, background colour and placement scale
//! - `[frame]` - Photo frame colour, width and drop shadow
//! - `[export]` - Output format, JPEG quality and destination directory
//! - `[background_removal]` - Model download URL and optional checksum
//!
//! Every field has its own default, so a partial file is valid. Values that
//! parse but make no sense (an unknown colour, an out-of-range zoom) are
//! replaced by defaults or clamped when turned into a [`WorkspaceConfig`].
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `COLLAGE_LENS_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use collage_lens::app::config;
//!
//! let (mut config, _warning) = config::load();
//! config.frame.width = 12.0;
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::domain::collage::{
    Color, FrameStyle, FrameWidth, JpegQuality, Resolution, WorkspaceConfig, ZoomPercent,
    ZoomStep,
};
use crate::error::{Error, Result};
use crate::media::background_removal::DEFAULT_MODEL_URL;
use crate::media::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Workspace settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceSection {
    /// Preset name (`hd`, `fullhd`, `4k`, ...) or `WIDTHxHEIGHT`.
    #[serde(default = "default_resolution")]
    pub resolution: String,

    #[serde(default = "default_zoom_percent")]
    pub zoom_percent: f32,

    #[serde(default = "default_zoom_step")]
    pub zoom_step_percent: f32,

    /// Background colour as `#rrggbb` or `#rrggbbaa`.
    #[serde(default = "default_background")]
    pub background: String,

    /// Image pixels to canvas units for newly placed items.
    #[serde(default = "default_placement_scale")]
    pub placement_scale: f64,
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            zoom_percent: default_zoom_percent(),
            zoom_step_percent: default_zoom_step(),
            background: default_background(),
            placement_scale: default_placement_scale(),
        }
    }
}

/// Photo frame settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameSection {
    #[serde(default = "default_frame_color")]
    pub color: String,

    /// Border per side, in canvas units.
    #[serde(default = "default_frame_width")]
    pub width: f64,

    #[serde(default = "default_frame_shadow")]
    pub shadow: bool,
}

impl Default for FrameSection {
    fn default() -> Self {
        Self {
            color: default_frame_color(),
            width: default_frame_width(),
            shadow: default_frame_shadow(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportSection {
    #[serde(default)]
    pub format: ExportFormat,

    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Directory for exports when no output path is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            jpeg_quality: default_jpeg_quality(),
            output_dir: None,
        }
    }
}

/// Background removal model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackgroundRemovalSection {
    #[serde(default = "default_model_url")]
    pub model_url: String,

    /// Expected BLAKE3 hash of the model; unchecked when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_checksum: Option<String>,
}

impl Default for BackgroundRemovalSection {
    fn default() -> Self {
        Self {
            model_url: default_model_url(),
            model_checksum: None,
        }
    }
}

// =============================================================================
// Main Config Struct
// =============================================================================

/// Application configuration with sectioned structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub frame: FrameSection,

    #[serde(default)]
    pub export: ExportSection,

    #[serde(default)]
    pub background_removal: BackgroundRemovalSection,
}

impl Config {
    /// Builds the editor workspace from these settings.
    ///
    /// Unparseable values fall back to their defaults with a logged warning;
    /// numeric values are clamped by the domain newtypes.
    #[must_use]
    pub fn workspace_config(&self) -> WorkspaceConfig {
        let resolution = self
            .workspace
            .resolution
            .parse::<Resolution>()
            .unwrap_or_else(|e| {
                log::warn!("{e}; using {}", Resolution::default());
                Resolution::default()
            });

        WorkspaceConfig {
            resolution,
            zoom: ZoomPercent::new(self.workspace.zoom_percent),
            zoom_step: ZoomStep::new(self.workspace.zoom_step_percent),
            background: parse_color_or(&self.workspace.background, Color::SLATE),
            frame: self.frame_style(),
            ..WorkspaceConfig::default()
        }
    }

    #[must_use]
    pub fn frame_style(&self) -> FrameStyle {
        FrameStyle {
            color: parse_color_or(&self.frame.color, Color::WHITE),
            width: FrameWidth::new(self.frame.width),
            shadow: self.frame.shadow,
        }
    }

    /// Placement scale clamped to its accepted range.
    #[must_use]
    pub fn placement_scale(&self) -> f64 {
        let scale = self.workspace.placement_scale;
        if scale.is_finite() {
            scale.clamp(MIN_PLACEMENT_SCALE, MAX_PLACEMENT_SCALE)
        } else {
            DEFAULT_PLACEMENT_SCALE
        }
    }

    #[must_use]
    pub fn jpeg_quality(&self) -> JpegQuality {
        JpegQuality::new(self.export.jpeg_quality)
    }
}

fn parse_color_or(raw: &str, fallback: Color) -> Color {
    raw.parse().unwrap_or_else(|e| {
        log::warn!("{e}; using {fallback}");
        fallback
    })
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_resolution() -> String {
    DEFAULT_RESOLUTION.to_string()
}

fn default_zoom_percent() -> f32 {
    DEFAULT_ZOOM_PERCENT
}

fn default_zoom_step() -> f32 {
    DEFAULT_ZOOM_STEP_PERCENT
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_placement_scale() -> f64 {
    DEFAULT_PLACEMENT_SCALE
}

fn default_frame_color() -> String {
    DEFAULT_FRAME_COLOR.to_string()
}

fn default_frame_width() -> f64 {
    DEFAULT_FRAME_WIDTH
}

fn default_frame_shadow() -> bool {
    DEFAULT_FRAME_SHADOW
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_model_url() -> String {
    DEFAULT_MODEL_URL.to_string()
}

// =============================================================================
// Config Path Resolution
// =============================================================================

/// Returns the config file path with an optional override.
fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(e) => {
                    return (
                        Config::default(),
                        Some(format!("ignoring {}: {e}", path.display())),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// this layout.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
///
/// # Errors
///
/// Returns an error if the file cannot be serialised or written.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
