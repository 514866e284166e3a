// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the port traits defined in
//! `application::port`. These adapters wrap external dependencies like ONNX
//! Runtime and the native file dialog.
//!
//! # Available Adapters
//!
//! - [`onnx`]: Background removal via ONNX Runtime (implements [`BackgroundRemover`])
//! - [`dialog`]: Native "open images" dialog via `rfd` (implements [`FilePicker`])
//!
//! [`BackgroundRemover`]: crate::application::port::BackgroundRemover
//! [`FilePicker`]: crate::application::port::FilePicker

pub mod dialog;
pub mod onnx;

pub use dialog::RfdFilePicker;
pub use onnx::OnnxBackgroundRemover;
