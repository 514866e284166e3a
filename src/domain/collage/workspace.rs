// SPDX-License-Identifier: MPL-2.0
//! Workspace configuration: resolution, zoom, pan, background and frame.
//!
//! Everything an editor handler needs to know about the composition region
//! lives in [`WorkspaceConfig`], which is owned by the session and passed
//! explicitly to the code that needs it.

use super::color::Color;
use super::geometry::{Point, Size};
use super::item::FrameStyle;
use super::newtypes::{ZoomPercent, ZoomStep};
use std::fmt;
use std::str::FromStr;

/// Width of the default stage, in canvas units.
pub const DEFAULT_STAGE_WIDTH: u32 = 1152;
/// Height of the default stage, in canvas units.
pub const DEFAULT_STAGE_HEIGHT: u32 = 719;

// =============================================================================
// Resolution
// =============================================================================

/// Nominal output resolution of the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Hd,
    FullHd,
    Qhd,
    Uhd4k,
    Square,
    Portrait,
    Custom { width: u32, height: u32 },
}

impl Resolution {
    /// Returns the named presets, smallest first.
    #[must_use]
    pub fn presets() -> &'static [Resolution] {
        &[
            Resolution::Hd,
            Resolution::FullHd,
            Resolution::Qhd,
            Resolution::Uhd4k,
            Resolution::Square,
            Resolution::Portrait,
        ]
    }

    #[must_use]
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::Hd => (1280, 720),
            Resolution::FullHd => (1920, 1080),
            Resolution::Qhd => (2560, 1440),
            Resolution::Uhd4k => (3840, 2160),
            Resolution::Square => (1080, 1080),
            Resolution::Portrait => (1080, 1920),
            Resolution::Custom { width, height } => (width, height),
        }
    }

    #[must_use]
    pub fn size(self) -> Size {
        let (width, height) = self.dimensions();
        Size::new(f64::from(width), f64::from(height))
    }

    /// Short name used in settings and on the command line.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        match self {
            Resolution::Hd => Some("hd"),
            Resolution::FullHd => Some("fullhd"),
            Resolution::Qhd => Some("qhd"),
            Resolution::Uhd4k => Some("4k"),
            Resolution::Square => Some("square"),
            Resolution::Portrait => Some("portrait"),
            Resolution::Custom { .. } => None,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Custom {
            width: DEFAULT_STAGE_WIDTH,
            height: DEFAULT_STAGE_HEIGHT,
        }
    }
}

/// Error returned for unknown preset names or malformed `WxH` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResolutionError(pub String);

impl fmt::Display for ParseResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid resolution '{}', expected a preset name or WIDTHxHEIGHT",
            self.0
        )
    }
}

impl std::error::Error for ParseResolutionError {}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "hd" | "720p" => return Ok(Resolution::Hd),
            "fullhd" | "full-hd" | "1080p" => return Ok(Resolution::FullHd),
            "qhd" | "1440p" => return Ok(Resolution::Qhd),
            "4k" | "uhd" | "2160p" => return Ok(Resolution::Uhd4k),
            "square" => return Ok(Resolution::Square),
            "portrait" => return Ok(Resolution::Portrait),
            _ => {}
        }

        let err = || ParseResolutionError(s.to_string());
        let (w, h) = normalized.split_once('x').ok_or_else(err)?;
        let width: u32 = w.trim().parse().map_err(|_| err())?;
        let height: u32 = h.trim().parse().map_err(|_| err())?;
        if width == 0 || height == 0 {
            return Err(err());
        }

        Ok(Self::presets()
            .iter()
            .copied()
            .find(|preset| preset.dimensions() == (width, height))
            .unwrap_or(Resolution::Custom { width, height }))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => {
                let (width, height) = self.dimensions();
                write!(f, "{width}x{height}")
            }
        }
    }
}

// =============================================================================
// WorkspaceArea
// =============================================================================

/// Target region of the arrangement, in on-screen canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspaceArea {
    pub width: f64,
    pub height: f64,
}

impl WorkspaceArea {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// WorkspaceConfig
// =============================================================================

/// All mutable editor settings that shape the composition.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    pub resolution: Resolution,
    pub zoom: ZoomPercent,
    pub zoom_step: ZoomStep,
    /// Screen-space offset of the workspace origin.
    pub pan: Point,
    pub background: Color,
    /// Style applied to newly placed photos.
    pub frame: FrameStyle,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            zoom: ZoomPercent::default(),
            zoom_step: ZoomStep::default(),
            pan: Point::default(),
            background: Color::SLATE,
            frame: FrameStyle::default(),
        }
    }
}

impl WorkspaceConfig {
    /// Arrangement region: nominal resolution scaled by the zoom factor.
    #[must_use]
    pub fn area(&self) -> WorkspaceArea {
        let size = self.resolution.size().scaled(self.zoom.as_factor());
        WorkspaceArea::new(size.width, size.height)
    }

    /// Output pixels per workspace unit so that an export always reaches
    /// the nominal resolution, whatever the current zoom.
    #[must_use]
    pub fn export_pixel_ratio(&self) -> f64 {
        self.resolution.size().width / self.area().width
    }

    /// Applies a wheel delta: positive zooms in, negative zooms out.
    pub fn zoom_by_wheel(&mut self, delta: f32) {
        if delta > 0.0 {
            self.zoom = self.zoom.zoom_in(self.zoom_step);
        } else if delta < 0.0 {
            self.zoom = self.zoom.zoom_out(self.zoom_step);
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Converts a screen position to workspace coordinates by removing pan.
    #[must_use]
    pub fn screen_to_workspace(&self, screen: Point) -> Point {
        Point::new(screen.x - self.pan.x, screen.y - self.pan.y)
    }

    #[must_use]
    pub fn workspace_to_screen(&self, point: Point) -> Point {
        Point::new(point.x + self.pan.x, point.y + self.pan.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn default_resolution_is_stage_size() {
        assert_eq!(Resolution::default().dimensions(), (1152, 719));
        assert_eq!(Resolution::default().to_string(), "1152x719");
    }

    #[test]
    fn parses_presets_and_custom_sizes() {
        assert_eq!("FullHD".parse::<Resolution>().unwrap(), Resolution::FullHd);
        assert_eq!("4k".parse::<Resolution>().unwrap(), Resolution::Uhd4k);
        assert_eq!(
            "1280x720".parse::<Resolution>().unwrap(),
            Resolution::Hd,
            "known dimensions resolve to the preset"
        );
        assert_eq!(
            "800 x 600".parse::<Resolution>().unwrap(),
            Resolution::Custom {
                width: 800,
                height: 600
            }
        );
        assert!("0x600".parse::<Resolution>().is_err());
        assert!("huge".parse::<Resolution>().is_err());
    }

    #[test]
    fn area_follows_zoom() {
        let mut config = WorkspaceConfig {
            resolution: Resolution::FullHd,
            ..WorkspaceConfig::default()
        };
        config.zoom = ZoomPercent::new(50.0);
        let area = config.area();
        assert_abs_diff_eq!(area.width, 960.0);
        assert_abs_diff_eq!(area.height, 540.0);
    }

    #[test]
    fn export_ratio_reaches_nominal_resolution() {
        for zoom in [25.0, 50.0, 100.0, 300.0] {
            let config = WorkspaceConfig {
                resolution: Resolution::Qhd,
                zoom: ZoomPercent::new(zoom),
                ..WorkspaceConfig::default()
            };
            let area = config.area();
            let ratio = config.export_pixel_ratio();
            assert_abs_diff_eq!(area.width * ratio, 2560.0, epsilon = 1e-6);
            assert_abs_diff_eq!(area.height * ratio, 1440.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn wheel_zoom_direction() {
        let mut config = WorkspaceConfig::default();
        config.zoom_by_wheel(1.0);
        assert_abs_diff_eq!(config.zoom.value(), 110.0);
        config.zoom_by_wheel(-1.0);
        config.zoom_by_wheel(-1.0);
        assert_abs_diff_eq!(config.zoom.value(), 90.0);
        config.zoom_by_wheel(0.0);
        assert_abs_diff_eq!(config.zoom.value(), 90.0);
    }

    #[test]
    fn pan_round_trips_coordinates() {
        let mut config = WorkspaceConfig::default();
        config.pan_by(30.0, -10.0);
        let screen = Point::new(100.0, 100.0);
        let workspace = config.screen_to_workspace(screen);
        assert_eq!(workspace, Point::new(70.0, 110.0));
        assert_eq!(config.workspace_to_screen(workspace), screen);
    }
}
