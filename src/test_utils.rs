// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and canvas fixtures.
//!
//! Float assertions come from the `approx` crate, which handles precision
//! issues that `assert_eq!` cannot.

pub use approx::assert_abs_diff_eq;

use crate::domain::collage::{CanvasItem, FrameStyle, ItemId, ItemKind};
use crate::domain::media::RawImage;

/// Tolerance for positions derived from rounded cell sizes.
pub const LAYOUT_EPSILON: f64 = 1e-6;

/// Opaque single-colour photo with the default frame at placement scale 1.
pub fn photo_item(id: u64, width: u32, height: u32) -> CanvasItem {
    CanvasItem::new(
        ItemId(id),
        ItemKind::Photo {
            frame: FrameStyle::default(),
        },
        RawImage::filled(width, height, [200, 120, 40, 255]),
        1.0,
    )
}

/// Half-transparent cut-out at placement scale 1.
pub fn object_item(id: u64, width: u32, height: u32) -> CanvasItem {
    CanvasItem::new(
        ItemId(id),
        ItemKind::Object,
        RawImage::filled(width, height, [20, 200, 90, 128]),
        1.0,
    )
}
