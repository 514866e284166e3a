// SPDX-License-Identifier: MPL-2.0
//! Background removal using the RMBG-1.4 segmentation model (ONNX).
//!
//! This module provides functionality for:
//! - Downloading the model from a configurable URL with byte progress
//! - Verifying model integrity with an optional BLAKE3 checksum
//! - Running inference to produce a foreground mask
//! - Multiplying that mask into the alpha channel of the source image
//!
//! # Pipeline
//!
//! The model works on a fixed 1024x1024 RGB input normalised as
//! `(v / 255 - 0.5) / 1.0`. Its single-channel output is min-max
//! normalised, resized back to the source dimensions and applied as alpha.

use crate::app::paths;
use crate::application::port::{RemovalError, RemovalProgress, RemovalStage};

/// Filename for the downloaded model in the data directory.
pub const MODEL_FILENAME: &str = "rmbg-1.4.onnx";

/// Where the model is fetched from unless configured otherwise.
pub const DEFAULT_MODEL_URL: &str =
    "https://huggingface.co/briaai/RMBG-1.4/resolve/main/onnx/model.onnx";

/// Square input edge expected by the model.
pub const WORKING_SIZE: u32 = 1024;

/// Minimum expected model size (10 MB) to detect failed downloads.
pub const MIN_MODEL_SIZE_BYTES: u64 = 10_000_000;

use image_rs::imageops::FilterType;
use image_rs::{DynamicImage, GrayImage, RgbaImage};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Cancellation token type for background tasks.
pub type CancellationToken = Arc<AtomicBool>;

/// Checks if the cancellation token has been triggered.
#[inline]
pub fn is_cancelled(token: &CancellationToken) -> bool {
    token.load(Ordering::SeqCst)
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while managing or running the model.
#[derive(Debug, Clone)]
pub enum ModelError {
    /// Model file not found at expected path.
    ModelNotFound,
    /// Failed to download the model.
    DownloadFailed(String),
    /// Model checksum verification failed.
    ChecksumMismatch { expected: String, actual: String },
    /// ONNX inference failed.
    InferenceFailed(String),
    /// Image preprocessing failed.
    PreprocessingFailed(String),
    /// Mask postprocessing failed.
    PostprocessingFailed(String),
    /// Operation was cancelled by user.
    Cancelled,
    /// IO error occurred.
    Io(String),
    /// Model session not initialized.
    SessionNotInitialized,
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ModelNotFound => write!(f, "Model file not found"),
            ModelError::DownloadFailed(msg) => write!(f, "Download failed: {msg}"),
            ModelError::ChecksumMismatch { expected, actual } => {
                write!(f, "Checksum mismatch: expected {expected}, got {actual}")
            }
            ModelError::InferenceFailed(msg) => write!(f, "Inference failed: {msg}"),
            ModelError::PreprocessingFailed(msg) => write!(f, "Preprocessing failed: {msg}"),
            ModelError::PostprocessingFailed(msg) => write!(f, "Postprocessing failed: {msg}"),
            ModelError::Cancelled => write!(f, "Operation cancelled"),
            ModelError::Io(msg) => write!(f, "IO error: {msg}"),
            ModelError::SessionNotInitialized => write!(f, "ONNX session not initialized"),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<ModelError> for RemovalError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::SessionNotInitialized | ModelError::ModelNotFound => {
                RemovalError::ModelNotReady
            }
            ModelError::Cancelled => RemovalError::Cancelled,
            ModelError::PreprocessingFailed(msg) => RemovalError::InvalidInput(msg),
            ModelError::DownloadFailed(_)
            | ModelError::ChecksumMismatch { .. }
            | ModelError::Io(_) => RemovalError::ModelLoadFailed(err.to_string()),
            ModelError::InferenceFailed(msg) | ModelError::PostprocessingFailed(msg) => {
                RemovalError::InferenceFailed(msg)
            }
        }
    }
}

/// Manager for the background removal model.
///
/// Handles model lifecycle: location, session loading, inference and
/// deletion. Downloading is a free function so it can run without holding
/// the manager lock.
pub struct BackgroundRemovalManager {
    model_path: PathBuf,
    session: Option<Session>,
}

impl Default for BackgroundRemovalManager {
    fn default() -> Self {
        Self::new(get_model_path())
    }
}

impl BackgroundRemovalManager {
    #[must_use]
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            session: None,
        }
    }

    /// Returns the path where the model is/will be stored.
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Checks if a plausibly complete model file exists on disk.
    #[must_use]
    pub fn is_model_downloaded(&self) -> bool {
        is_model_file_complete(&self.model_path)
    }

    /// Loads the ONNX session from the model file.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is not found, the operation is
    /// cancelled, or the ONNX session fails to initialize.
    pub fn load_session(&mut self, cancel_token: Option<&CancellationToken>) -> ModelResult<()> {
        if cancel_token.is_some_and(is_cancelled) {
            return Err(ModelError::Cancelled);
        }

        if !self.model_path.exists() {
            return Err(ModelError::ModelNotFound);
        }

        let session = Session::builder()
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?
            .commit_from_file(&self.model_path)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

        log::info!("loaded background removal model from {}", self.model_path.display());
        self.session = Some(session);
        Ok(())
    }

    /// Checks if the ONNX session is loaded and ready.
    #[must_use]
    pub fn is_session_ready(&self) -> bool {
        self.session.is_some()
    }

    /// Runs the model on `image` and returns an RGBA copy whose alpha has
    /// been multiplied by the predicted foreground mask.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not initialized, the image is
    /// empty, or the ONNX inference fails.
    pub fn remove_background(
        &mut self,
        image: &DynamicImage,
        progress: &mut dyn FnMut(RemovalProgress),
    ) -> ModelResult<DynamicImage> {
        let session = self
            .session
            .as_mut()
            .ok_or(ModelError::SessionNotInitialized)?;

        progress(RemovalProgress::new(RemovalStage::Preprocess, 0, 1));
        let input_tensor = preprocess_image(image)?;
        let input_tensor = input_tensor.as_standard_layout().into_owned();
        progress(RemovalProgress::new(RemovalStage::Preprocess, 1, 1));

        let input_name = session
            .inputs
            .first()
            .map_or_else(|| "input".to_string(), |i| i.name.clone());

        let input_ref = ort::value::TensorRef::from_array_view(&input_tensor)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

        progress(RemovalProgress::new(RemovalStage::Inference, 0, 1));
        let outputs = session
            .run(ort::inputs![input_name.as_str() => input_ref])
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;
        progress(RemovalProgress::new(RemovalStage::Inference, 1, 1));

        progress(RemovalProgress::new(RemovalStage::Postprocess, 0, 1));
        let mask = extract_mask(&outputs)?;
        let mask = image_rs::imageops::resize(
            &mask,
            image.width(),
            image.height(),
            FilterType::Triangle,
        );
        let mut rgba = image.to_rgba8();
        apply_mask(&mut rgba, &mask);
        progress(RemovalProgress::new(RemovalStage::Postprocess, 1, 1));

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    /// Deletes the model file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be deleted.
    pub fn delete_model(&mut self) -> ModelResult<()> {
        self.session = None;
        if self.model_path.exists() {
            std::fs::remove_file(&self.model_path).map_err(|e| ModelError::Io(e.to_string()))?;
        }
        Ok(())
    }
}

/// Returns the default path where the model should be stored.
#[must_use]
pub fn get_model_path() -> PathBuf {
    paths::get_app_data_dir().map_or_else(
        || PathBuf::from(MODEL_FILENAME),
        |mut p| {
            p.push(MODEL_FILENAME);
            p
        },
    )
}

/// Checks that `path` exists and is at least [`MIN_MODEL_SIZE_BYTES`].
#[must_use]
pub fn is_model_file_complete(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| meta.len() >= MIN_MODEL_SIZE_BYTES)
}

/// Downloads the model from `url` into `dest`.
///
/// Bytes are streamed to a `.part` file that is renamed into place once
/// the download is complete. Returns the number of bytes downloaded.
///
/// # Errors
///
/// Returns an error if the download fails, is cancelled, looks truncated,
/// or the file cannot be written.
pub async fn download_model(
    url: &str,
    dest: &Path,
    cancel_token: Option<&CancellationToken>,
    mut progress: impl FnMut(RemovalProgress) + Send,
) -> ModelResult<u64> {
    use futures_util::StreamExt;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(concat!("CollageLens/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ModelError::DownloadFailed(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ModelError::DownloadFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ModelError::DownloadFailed(format!(
            "HTTP status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    if total_size > 0 && total_size < MIN_MODEL_SIZE_BYTES {
        return Err(ModelError::DownloadFailed(format!(
            "Response too small ({total_size} bytes), expected a model file. URL may have changed or returned an error page."
        )));
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ModelError::Io(e.to_string()))?;
    }

    let partial_path = dest.with_extension("onnx.part");
    let mut file =
        std::fs::File::create(&partial_path).map_err(|e| ModelError::Io(e.to_string()))?;

    log::info!("downloading background removal model from {url}");
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        if cancel_token.is_some_and(is_cancelled) {
            drop(file);
            let _ = std::fs::remove_file(&partial_path);
            return Err(ModelError::Cancelled);
        }

        let chunk = chunk.map_err(|e| ModelError::DownloadFailed(e.to_string()))?;
        std::io::Write::write_all(&mut file, &chunk).map_err(|e| ModelError::Io(e.to_string()))?;

        downloaded += chunk.len() as u64;
        progress(RemovalProgress::new(
            RemovalStage::Download,
            downloaded,
            total_size,
        ));
    }
    drop(file);

    if downloaded < MIN_MODEL_SIZE_BYTES {
        let _ = std::fs::remove_file(&partial_path);
        return Err(ModelError::DownloadFailed(format!(
            "Downloaded file too small ({downloaded} bytes)"
        )));
    }

    std::fs::rename(&partial_path, dest).map_err(|e| ModelError::Io(e.to_string()))?;
    log::info!("model saved to {} ({downloaded} bytes)", dest.display());
    Ok(downloaded)
}

/// Verifies the model file integrity using a BLAKE3 hash.
///
/// # Errors
///
/// Returns an error if the model file is not found, cannot be read,
/// or the checksum does not match.
pub fn verify_checksum(path: &Path, expected_hash: &str) -> ModelResult<()> {
    let actual_hash = compute_model_hash(path)?;

    if !actual_hash.eq_ignore_ascii_case(expected_hash.trim()) {
        return Err(ModelError::ChecksumMismatch {
            expected: expected_hash.to_string(),
            actual: actual_hash,
        });
    }

    Ok(())
}

/// Computes the BLAKE3 hash of the model file.
///
/// # Errors
///
/// Returns an error if the model file is not found or cannot be read.
pub fn compute_model_hash(path: &Path) -> ModelResult<String> {
    if !path.exists() {
        return Err(ModelError::ModelNotFound);
    }

    let file_data = std::fs::read(path).map_err(|e| ModelError::Io(e.to_string()))?;
    Ok(blake3::hash(&file_data).to_hex().to_string())
}

/// Validates the model by running a test inference on a 64x64 grey image.
///
/// # Errors
///
/// Returns an error if validation is cancelled or the model fails inference.
pub fn validate_model(
    manager: &mut BackgroundRemovalManager,
    cancel_token: Option<&CancellationToken>,
) -> ModelResult<()> {
    if cancel_token.is_some_and(is_cancelled) {
        return Err(ModelError::Cancelled);
    }

    let test_image = DynamicImage::ImageRgb8(image_rs::RgbImage::from_pixel(
        64,
        64,
        image_rs::Rgb([128, 128, 128]),
    ));

    // Inference itself cannot be interrupted; check once more before it.
    if cancel_token.is_some_and(is_cancelled) {
        return Err(ModelError::Cancelled);
    }

    let result = manager.remove_background(&test_image, &mut |_| {})?;

    if result.width() != 64 || result.height() != 64 {
        return Err(ModelError::InferenceFailed(format!(
            "Unexpected output size: {}x{}, expected 64x64",
            result.width(),
            result.height()
        )));
    }

    Ok(())
}

/// Preprocesses an image for inference.
///
/// Resizes to [`WORKING_SIZE`] squared and converts to NCHW
/// (batch=1, channels=3, height, width), RGB order, `v / 255 - 0.5`.
fn preprocess_image(img: &DynamicImage) -> ModelResult<Array4<f32>> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ModelError::PreprocessingFailed(
            "image has no pixels".to_string(),
        ));
    }

    let rgb = img
        .resize_exact(WORKING_SIZE, WORKING_SIZE, FilterType::Triangle)
        .to_rgb8();
    let side = WORKING_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (x, y) = (x as usize, y as usize);
        tensor[[0, 0, y, x]] = f32::from(r) / 255.0 - 0.5;
        tensor[[0, 1, y, x]] = f32::from(g) / 255.0 - 0.5;
        tensor[[0, 2, y, x]] = f32::from(b) / 255.0 - 0.5;
    }

    Ok(tensor)
}

/// Turns the first model output into a greyscale mask at model resolution.
fn extract_mask(outputs: &ort::session::SessionOutputs<'_>) -> ModelResult<GrayImage> {
    let (_, output) = outputs
        .iter()
        .next()
        .ok_or_else(|| ModelError::PostprocessingFailed("No output tensor".to_string()))?;

    let (shape, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e: ort::Error| ModelError::PostprocessingFailed(e.to_string()))?;

    // [batch, 1, height, width] or [batch, height, width]; the last two
    // dimensions are the mask size either way.
    if shape.len() < 2 {
        return Err(ModelError::PostprocessingFailed(format!(
            "Expected at least 2D tensor, got {}D",
            shape.len()
        )));
    }

    let height = u32::try_from(shape[shape.len() - 2])
        .map_err(|_| ModelError::PostprocessingFailed("Invalid tensor height".to_string()))?;
    let width = u32::try_from(shape[shape.len() - 1])
        .map_err(|_| ModelError::PostprocessingFailed("Invalid tensor width".to_string()))?;

    let pixel_count = (width as usize) * (height as usize);
    let plane = data.get(..pixel_count).ok_or_else(|| {
        ModelError::PostprocessingFailed("Output tensor shorter than its shape".to_string())
    })?;

    normalize_mask(width, height, plane)
}

/// Min-max normalises raw model output into a `0..=255` mask.
///
/// A flat output carries no segmentation and keeps everything.
fn normalize_mask(width: u32, height: u32, values: &[f32]) -> ModelResult<GrayImage> {
    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    let pixels = values
        .iter()
        .map(|&v| {
            let normalized = if range > f32::EPSILON {
                (v - min) / range
            } else {
                1.0
            };
            // Clamped to 0.0..=255.0 before the cast.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = (normalized * 255.0).clamp(0.0, 255.0).round() as u8;
            value
        })
        .collect();

    GrayImage::from_raw(width, height, pixels)
        .ok_or_else(|| ModelError::PostprocessingFailed("Failed to create mask".to_string()))
}

/// Multiplies each pixel's alpha by the mask value at the same position.
fn apply_mask(image: &mut RgbaImage, mask: &GrayImage) {
    for (pixel, mask_pixel) in image.pixels_mut().zip(mask.pixels()) {
        let product = u16::from(pixel.0[3]) * u16::from(mask_pixel.0[0]);
        // (a * m + 127) / 255 stays within u8.
        #[allow(clippy::cast_possible_truncation)]
        let alpha = ((product + 127) / 255) as u8;
        pixel.0[3] = alpha;
    }
}

/// Thread-safe wrapper for [`BackgroundRemovalManager`].
pub type SharedRemovalManager = Arc<Mutex<BackgroundRemovalManager>>;

/// Creates a shared manager using the default model path.
#[must_use]
pub fn create_shared_manager() -> SharedRemovalManager {
    Arc::new(Mutex::new(BackgroundRemovalManager::default()))
}
