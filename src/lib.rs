// SPDX-License-Identifier: MPL-2.0
//! `collage_lens` composes photos and cut-out objects into a collage.
//!
//! Images are placed on a virtual canvas, auto-arranged in a grid with a
//! slight random tilt, and exported at a chosen resolution. Objects get
//! their background removed by an ONNX model that is downloaded on demand.

#![doc(html_root_url = "https://docs.rs/collage_lens/0.1.0")]

pub mod app;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod media;

#[cfg(test)]
mod test_utils;
