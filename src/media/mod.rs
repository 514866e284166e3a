// SPDX-License-Identifier: MPL-2.0
//! Pixel-level media handling.
//!
//! Decoding uploads, cutting out backgrounds, rasterising the workspace
//! and encoding the result all live here, on top of the `image`,
//! `tiny-skia` and `ort` crates.

pub mod background_removal;
pub mod compose;
pub mod export;
pub mod loader;

pub use export::{ExportFormat, ExportedImage};
pub use loader::load_image;
