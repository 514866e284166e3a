// SPDX-License-Identifier: MPL-2.0
//! Background removal port definition.
//!
//! This module defines the [`BackgroundRemover`] trait used to turn a photo
//! into a cut-out object with a transparent background.
//!
//! # Design Notes
//!
//! - Progress is reported through a caller-supplied callback with a stage
//!   tag and a current/total pair
//! - Model downloading and validation is implementation-specific
//! - The trait is `Send + Sync` so removers can be shared across the
//!   blocking tasks of an upload

use crate::domain::media::RawImage;
use std::fmt;

// =============================================================================
// RemovalError
// =============================================================================

/// Errors that can occur during background removal.
#[derive(Debug, Clone)]
pub enum RemovalError {
    /// The model is not ready (not downloaded or not loaded).
    ModelNotReady,

    /// The model file could not be loaded.
    ModelLoadFailed(String),

    /// Inference failed during processing.
    InferenceFailed(String),

    /// The input image cannot be processed (e.g. zero-sized).
    InvalidInput(String),

    /// The request was cancelled before completion.
    Cancelled,
}

impl fmt::Display for RemovalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalError::ModelNotReady => write!(f, "Background removal model is not ready"),
            RemovalError::ModelLoadFailed(msg) => write!(f, "Failed to load model: {msg}"),
            RemovalError::InferenceFailed(msg) => write!(f, "Inference failed: {msg}"),
            RemovalError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            RemovalError::Cancelled => write!(f, "Background removal cancelled"),
        }
    }
}

impl std::error::Error for RemovalError {}

// =============================================================================
// Progress
// =============================================================================

/// Coarse phase of a background removal job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalStage {
    /// Fetching model bytes.
    Download,
    /// Resizing and normalising the input tensor.
    Preprocess,
    /// Running the segmentation model.
    Inference,
    /// Turning the mask into an alpha channel.
    Postprocess,
}

impl RemovalStage {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RemovalStage::Download => "download",
            RemovalStage::Preprocess => "preprocess",
            RemovalStage::Inference => "inference",
            RemovalStage::Postprocess => "postprocess",
        }
    }
}

/// Progress report: `current` out of `total` units for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalProgress {
    pub stage: RemovalStage,
    pub current: u64,
    pub total: u64,
}

impl RemovalProgress {
    #[must_use]
    pub const fn new(stage: RemovalStage, current: u64, total: u64) -> Self {
        Self {
            stage,
            current,
            total,
        }
    }

    /// Completion of this stage in `[0, 1]`; an unknown total reads as 0.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        // Display-only value; precision loss is irrelevant here.
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let fraction = (self.current.min(self.total) as f64 / self.total as f64) as f32;
        fraction
    }

    /// Whole-number percentage for log lines.
    #[must_use]
    pub fn percent(&self) -> u8 {
        // fraction() is within 0.0..=1.0.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (self.fraction() * 100.0).round() as u8;
        percent
    }
}

impl fmt::Display for RemovalProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} ({}%)",
            self.stage.label(),
            self.current,
            self.total,
            self.percent()
        )
    }
}

// =============================================================================
// RemoverCapabilities
// =============================================================================

/// Describes what a remover can do before invoking it.
#[derive(Debug, Clone)]
pub struct RemoverCapabilities {
    /// Human-readable name of the model.
    pub name: &'static str,

    /// Square input edge the model works at; inputs are resized to it.
    pub working_size: u32,
}

impl RemoverCapabilities {
    #[must_use]
    pub const fn new(name: &'static str, working_size: u32) -> Self {
        Self { name, working_size }
    }
}

// =============================================================================
// BackgroundRemover Trait
// =============================================================================

/// Port for background removal.
///
/// Infrastructure adapters implement this trait using ONNX Runtime or
/// another ML framework.
///
/// # Example
///
/// ```ignore
/// use collage_lens::application::port::{BackgroundRemover, RemovalError};
///
/// fn cut_out(remover: &impl BackgroundRemover, image: &RawImage) -> Result<RawImage, RemovalError> {
///     if !remover.is_ready() {
///         return Err(RemovalError::ModelNotReady);
///     }
///     remover.remove(image, &mut |progress| log::info!("{progress}"))
/// }
/// ```
pub trait BackgroundRemover: Send + Sync {
    /// Returns a copy of `image` whose background pixels are transparent.
    ///
    /// # Errors
    ///
    /// Returns a [`RemovalError`] if the model is not ready, the input is
    /// unusable, or inference fails.
    fn remove(
        &self,
        image: &RawImage,
        progress: &mut dyn FnMut(RemovalProgress),
    ) -> Result<RawImage, RemovalError>;

    /// Checks if the model is loaded and ready for processing.
    fn is_ready(&self) -> bool;

    fn capabilities(&self) -> RemoverCapabilities;
}
