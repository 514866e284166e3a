// SPDX-License-Identifier: MPL-2.0
//! Default values for every configuration field.
//!
//! Bounds that the domain newtypes enforce are re-exported from there so
//! there is one source of truth per value.
//!
//! # Categories
//!
//! - **Workspace**: resolution, zoom, background and placement scale
//! - **Frame**: photo border colour, width and shadow
//! - **Export**: output format and JPEG quality

pub use crate::domain::collage::newtypes::frame_bounds::{
    DEFAULT as DEFAULT_FRAME_WIDTH, MAX as MAX_FRAME_WIDTH, MIN as MIN_FRAME_WIDTH,
};
pub use crate::domain::collage::newtypes::jpeg_quality_bounds::DEFAULT as DEFAULT_JPEG_QUALITY;
pub use crate::domain::collage::newtypes::zoom_bounds::{
    DEFAULT_PERCENT as DEFAULT_ZOOM_PERCENT, DEFAULT_STEP as DEFAULT_ZOOM_STEP_PERCENT,
};

// ==========================================================================
// Workspace Defaults
// ==========================================================================

/// Nominal output size when nothing else is configured.
pub const DEFAULT_RESOLUTION: &str = "1152x719";

/// Slate grey stage background.
pub const DEFAULT_BACKGROUND: &str = "#8598A9";

/// Image pixels to canvas units for newly placed items.
pub const DEFAULT_PLACEMENT_SCALE: f64 = crate::application::scene::DEFAULT_PLACEMENT_SCALE;

/// Smallest accepted placement scale.
pub const MIN_PLACEMENT_SCALE: f64 = 0.01;

/// Largest accepted placement scale.
pub const MAX_PLACEMENT_SCALE: f64 = 10.0;

// ==========================================================================
// Frame Defaults
// ==========================================================================

pub const DEFAULT_FRAME_COLOR: &str = "#FFFFFF";

pub const DEFAULT_FRAME_SHADOW: bool = true;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collage::{Color, Resolution};

    #[test]
    fn string_defaults_parse() {
        assert_eq!(
            DEFAULT_RESOLUTION.parse::<Resolution>().unwrap(),
            Resolution::default()
        );
        assert_eq!(DEFAULT_BACKGROUND.parse::<Color>().unwrap(), Color::SLATE);
        assert_eq!(DEFAULT_FRAME_COLOR.parse::<Color>().unwrap(), Color::WHITE);
    }

    #[test]
    fn placement_scale_default_within_bounds() {
        assert!((MIN_PLACEMENT_SCALE..=MAX_PLACEMENT_SCALE).contains(&DEFAULT_PLACEMENT_SCALE));
        assert!((MIN_FRAME_WIDTH..=MAX_FRAME_WIDTH).contains(&DEFAULT_FRAME_WIDTH));
    }
}
