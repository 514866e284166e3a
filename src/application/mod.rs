// SPDX-License-Identifier: MPL-2.0
//! Application layer - Use cases and orchestration.
//!
//! - [`arrange`]: Grid auto-arrangement of canvas items
//! - [`scene`]: Item collection with hit-testing, selection and deletion
//! - [`pipeline`]: Asynchronous upload pipeline (decode, cut out, place)
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The session and CLI drive application services
//!
//! # Example
//!
//! ```
//! use collage_lens::application::scene::Scene;
//! use collage_lens::domain::collage::{ItemKind, WorkspaceArea};
//! use collage_lens::domain::media::RawImage;
//!
//! let mut scene = Scene::new();
//! scene.add(RawImage::filled(640, 480, [255, 255, 255, 255]), ItemKind::Object, 0.1);
//! scene.arrange(WorkspaceArea::new(1152.0, 719.0));
//! assert_eq!(scene.len(), 1);
//! ```

pub mod arrange;
pub mod pipeline;
pub mod port;
pub mod scene;
