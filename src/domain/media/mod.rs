// SPDX-License-Identifier: MPL-2.0
//! Media domain types.
//!
//! This module contains the decoded image representation shared by the
//! loader, the background remover and the renderer.

pub mod types;

pub use types::RawImage;
