// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core collage types with ZERO external dependencies.
//!
//! This module contains pure domain types, value objects, and business rules.
//! It has no dependencies on external crates (except `std`) so that the
//! layout arithmetic can be tested in isolation.
//!
//! # Modules
//!
//! - [`collage`]: Canvas items, geometry, colours, frame styling and the
//!   workspace configuration ([`CanvasItem`](collage::CanvasItem),
//!   [`WorkspaceConfig`](collage::WorkspaceConfig))
//! - [`media`]: Decoded pixel data ([`RawImage`](media::RawImage))

pub mod collage;
pub mod media;
