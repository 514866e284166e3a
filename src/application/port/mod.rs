// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use only domain types, so the application layer stays
//! independent of ONNX Runtime or any dialog toolkit.
//!
//! # Available Ports
//!
//! - [`background_removal`]: Cut-out generation with progress reporting
//! - [`file_picker`]: User-driven multi-file selection

pub mod background_removal;
pub mod file_picker;

pub use background_removal::{
    BackgroundRemover, RemovalError, RemovalProgress, RemovalStage, RemoverCapabilities,
};
pub use file_picker::{has_image_extension, FilePicker, IMAGE_EXTENSIONS};
