// SPDX-License-Identifier: MPL-2.0
//! File picker port definition.

use std::future::Future;
use std::path::PathBuf;

/// Extensions offered by pickers and accepted by the loader.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "gif", "bmp", "tif", "tiff", "ico",
];

/// Port for a user-driven "open files" dialog.
///
/// A cancelled dialog yields an empty list rather than an error.
pub trait FilePicker {
    fn pick_images(&self, title: &str) -> impl Future<Output = Vec<PathBuf>> + Send;
}

/// Returns `true` if `path` has one of the [`IMAGE_EXTENSIONS`].
#[must_use]
pub fn has_image_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}
