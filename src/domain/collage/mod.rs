// SPDX-License-Identifier: MPL-2.0
//! Collage domain types.
//!
//! - [`CanvasItem`]: a placed photo or cut-out object
//! - [`ItemKind`]: `Photo { frame }` or `Object`, fixed at creation
//! - [`WorkspaceConfig`]: resolution, zoom, pan, background and frame style
//! - [`Color`], [`Point`], [`Rect`], [`Size`]: value objects

pub mod color;
pub mod geometry;
pub mod item;
pub mod newtypes;
pub mod workspace;

pub use color::{Color, ParseColorError};
pub use geometry::{Point, Rect, Size};
pub use item::{
    CanvasItem, FrameStyle, ItemId, ItemKind, KindTag, Transform, SHADOW_BLUR, SHADOW_OFFSET,
    SHADOW_OPACITY,
};
pub use newtypes::{FrameWidth, JpegQuality, ZoomPercent, ZoomStep};
pub use workspace::{ParseResolutionError, Resolution, WorkspaceArea, WorkspaceConfig};
