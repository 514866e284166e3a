// SPDX-License-Identifier: MPL-2.0
//! Native file dialog adapter implementing the [`FilePicker`] port.
//!
//! [`FilePicker`]: crate::application::port::FilePicker

use crate::application::port::{FilePicker, IMAGE_EXTENSIONS};
use std::future::Future;
use std::path::PathBuf;

/// Multi-select "open images" dialog backed by `rfd`.
#[derive(Debug, Clone, Default)]
pub struct RfdFilePicker {
    starting_directory: Option<PathBuf>,
}

impl RfdFilePicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the dialog in `dir` when it exists.
    #[must_use]
    pub fn with_directory(mut self, dir: PathBuf) -> Self {
        self.starting_directory = Some(dir);
        self
    }
}

impl FilePicker for RfdFilePicker {
    fn pick_images(&self, title: &str) -> impl Future<Output = Vec<PathBuf>> + Send {
        let title = title.to_string();
        let directory = self.starting_directory.clone();

        async move {
            let mut dialog = rfd::AsyncFileDialog::new()
                .set_title(&title)
                .add_filter("Images", IMAGE_EXTENSIONS);

            if let Some(dir) = directory.filter(|dir| dir.exists()) {
                dialog = dialog.set_directory(&dir);
            }

            let paths: Vec<PathBuf> = dialog
                .pick_files()
                .await
                .map(|handles| handles.iter().map(|h| h.path().to_path_buf()).collect())
                .unwrap_or_default();

            log::debug!("file dialog returned {} paths", paths.len());
            paths
        }
    }
}
