// SPDX-License-Identifier: MPL-2.0
//! Collage newtypes.
//!
//! This module provides type-safe wrappers for workspace values,
//! ensuring they are always within valid ranges.

// =============================================================================
// Zoom Bounds
// =============================================================================

/// Zoom percentage bounds (10% to 800%).
pub mod zoom_bounds {
    /// Minimum zoom percentage.
    pub const MIN_PERCENT: f32 = 10.0;
    /// Maximum zoom percentage.
    pub const MAX_PERCENT: f32 = 800.0;
    /// Default zoom percentage.
    pub const DEFAULT_PERCENT: f32 = 100.0;
    /// Minimum zoom step percentage.
    pub const MIN_STEP: f32 = 1.0;
    /// Maximum zoom step percentage.
    pub const MAX_STEP: f32 = 200.0;
    /// Default zoom step percentage.
    pub const DEFAULT_STEP: f32 = 10.0;
}

// =============================================================================
// ZoomPercent
// =============================================================================

/// Zoom percentage, guaranteed to be within valid range (10%–800%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPercent(f32);

impl ZoomPercent {
    /// Creates a new zoom percentage, clamping the value to the valid range.
    #[must_use]
    pub fn new(percent: f32) -> Self {
        Self(percent.clamp(zoom_bounds::MIN_PERCENT, zoom_bounds::MAX_PERCENT))
    }

    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns the zoom as a multiplier (e.g., 100% → 1.0).
    #[must_use]
    pub fn as_factor(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    #[must_use]
    pub fn is_min(self) -> bool {
        self.0 <= zoom_bounds::MIN_PERCENT
    }

    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= zoom_bounds::MAX_PERCENT
    }

    #[must_use]
    pub fn zoom_in(self, step: ZoomStep) -> Self {
        Self::new(self.0 + step.value())
    }

    #[must_use]
    pub fn zoom_out(self, step: ZoomStep) -> Self {
        Self::new(self.0 - step.value())
    }
}

impl Default for ZoomPercent {
    fn default() -> Self {
        Self(zoom_bounds::DEFAULT_PERCENT)
    }
}

// =============================================================================
// ZoomStep
// =============================================================================

/// Zoom step percentage, guaranteed to be within valid range (1%–200%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomStep(f32);

impl ZoomStep {
    /// Creates a new zoom step, clamping the value to the valid range.
    #[must_use]
    pub fn new(percent: f32) -> Self {
        Self(percent.clamp(zoom_bounds::MIN_STEP, zoom_bounds::MAX_STEP))
    }

    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for ZoomStep {
    fn default() -> Self {
        Self(zoom_bounds::DEFAULT_STEP)
    }
}

// =============================================================================
// Frame Width Bounds
// =============================================================================

/// Photo frame border bounds, per side, in canvas units.
pub mod frame_bounds {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 200.0;
    /// Half of the classic 40-unit frame, applied on each side.
    pub const DEFAULT: f64 = 20.0;
}

// =============================================================================
// FrameWidth
// =============================================================================

/// Border thickness drawn around a photo on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameWidth(f64);

impl FrameWidth {
    /// Creates a new frame width, clamping the value to the valid range.
    #[must_use]
    pub fn new(width: f64) -> Self {
        Self(width.clamp(frame_bounds::MIN, frame_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 <= frame_bounds::MIN
    }
}

impl Default for FrameWidth {
    fn default() -> Self {
        Self(frame_bounds::DEFAULT)
    }
}

// =============================================================================
// JpegQuality
// =============================================================================

/// JPEG quality bounds.
pub mod jpeg_quality_bounds {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;
    pub const DEFAULT: u8 = 92;
}

/// JPEG encoder quality (1–100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegQuality(u8);

impl JpegQuality {
    #[must_use]
    pub fn new(quality: u8) -> Self {
        Self(quality.clamp(jpeg_quality_bounds::MIN, jpeg_quality_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for JpegQuality {
    fn default() -> Self {
        Self(jpeg_quality_bounds::DEFAULT)
    }
}
