// SPDX-License-Identifier: MPL-2.0
//! RMBG-1.4 adapter implementing the [`BackgroundRemover`] trait.
//!
//! [`BackgroundRemover`]: crate::application::port::BackgroundRemover

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::application::port::{
    BackgroundRemover, RemovalError, RemovalProgress, RemoverCapabilities,
};
use crate::domain::media::RawImage;
use crate::media::background_removal::{
    create_shared_manager, BackgroundRemovalManager, SharedRemovalManager, WORKING_SIZE,
};
use crate::media::loader;

/// ONNX-based background remover.
///
/// Wraps [`BackgroundRemovalManager`] and converts between [`RawImage`]
/// and image crate types internally. Inference calls are serialised by
/// the inner lock, so one remover can be shared by every upload task.
///
/// # Example
///
/// ```ignore
/// use collage_lens::infrastructure::onnx::OnnxBackgroundRemover;
/// use collage_lens::application::port::BackgroundRemover;
///
/// let remover = OnnxBackgroundRemover::new();
/// remover.load()?;
/// let cut_out = remover.remove(&photo, &mut |p| log::debug!("{p}"))?;
/// ```
pub struct OnnxBackgroundRemover {
    manager: SharedRemovalManager,
}

impl Default for OnnxBackgroundRemover {
    fn default() -> Self {
        Self::new()
    }
}

impl OnnxBackgroundRemover {
    /// Creates a remover using the model in the default data directory.
    #[must_use]
    pub fn new() -> Self {
        Self::from_manager(create_shared_manager())
    }

    /// Creates a remover for a model stored at `model_path`.
    #[must_use]
    pub fn with_model_path(model_path: PathBuf) -> Self {
        Self::from_manager(Arc::new(Mutex::new(BackgroundRemovalManager::new(
            model_path,
        ))))
    }

    /// Creates a remover from an existing manager.
    #[must_use]
    pub fn from_manager(manager: SharedRemovalManager) -> Self {
        Self { manager }
    }

    /// Returns the underlying manager, for model lifecycle operations.
    #[must_use]
    pub fn manager(&self) -> &SharedRemovalManager {
        &self.manager
    }

    /// Loads the model session.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not downloaded or loading fails.
    pub fn load(&self) -> Result<(), RemovalError> {
        let mut manager = self
            .manager
            .lock()
            .map_err(|_| RemovalError::ModelLoadFailed("Lock poisoned".to_string()))?;

        manager
            .load_session(None)
            .map_err(|e| RemovalError::ModelLoadFailed(e.to_string()))
    }
}

impl BackgroundRemover for OnnxBackgroundRemover {
    fn remove(
        &self,
        image: &RawImage,
        progress: &mut dyn FnMut(RemovalProgress),
    ) -> Result<RawImage, RemovalError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RemovalError::InvalidInput("image has no pixels".to_string()));
        }

        let dynamic = loader::to_dynamic(image)
            .map_err(|e| RemovalError::InvalidInput(e.to_string()))?;

        let mut manager = self
            .manager
            .lock()
            .map_err(|_| RemovalError::InferenceFailed("Lock poisoned".to_string()))?;

        let result = manager.remove_background(&dynamic, progress)?;
        Ok(loader::from_dynamic(result))
    }

    fn is_ready(&self) -> bool {
        self.manager
            .lock()
            .map(|m| m.is_session_ready())
            .unwrap_or(false)
    }

    fn capabilities(&self) -> RemoverCapabilities {
        RemoverCapabilities::new("RMBG-1.4", WORKING_SIZE)
    }
}
