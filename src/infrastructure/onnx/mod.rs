// SPDX-License-Identifier: MPL-2.0
//! ONNX Runtime adapters implementing the [`BackgroundRemover`] port trait.
//!
//! - [`OnnxBackgroundRemover`]: RMBG-1.4 segmentation turned into an alpha cut-out
//!
//! # Design Notes
//!
//! - The adapter wraps the existing `BackgroundRemovalManager`
//! - It converts between domain types ([`RawImage`]) and image crate types
//! - The underlying manager handles model loading and ONNX inference
//!
//! [`BackgroundRemover`]: crate::application::port::BackgroundRemover
//! [`RawImage`]: crate::domain::media::RawImage

mod background_removal;

pub use background_removal::OnnxBackgroundRemover;
