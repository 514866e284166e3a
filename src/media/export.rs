// SPDX-License-Identifier: MPL-2.0
//! Collage export to PNG or JPEG.
//!
//! The workspace is rendered at the pixel ratio that brings it back to the
//! nominal resolution, then encoded in memory. Writing to disk is a
//! separate step so callers can choose the destination.

use crate::domain::collage::{CanvasItem, JpegQuality, WorkspaceConfig};
use crate::domain::media::RawImage;
use crate::error::{Error, Result};
use crate::media::{compose, loader};
use chrono::{Local, NaiveDateTime};
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG (lossless, keeps alpha).
    #[default]
    Png,
    /// JPEG (lossy, alpha dropped).
    Jpeg,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG (Lossless)",
            ExportFormat::Jpeg => "JPEG (Lossy)",
        }
    }

    #[must_use]
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Png, ExportFormat::Jpeg]
    }

    /// Detects format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }

    /// Detects format from file path extension.
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "png"),
            ExportFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim())
            .ok_or_else(|| Error::Export(format!("unsupported format '{s}' (use png or jpeg)")))
    }
}

/// An encoded collage ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    /// Writes the encoded bytes to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory or file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &self.bytes)?;
        log::info!(
            "saved {}x{} {} to {}",
            self.width,
            self.height,
            self.format,
            path.display()
        );
        Ok(())
    }
}

/// Renders the workspace at its nominal resolution and encodes it.
///
/// # Errors
///
/// Returns [`Error::Export`] if rendering or encoding fails.
pub fn export(
    items: &[CanvasItem],
    workspace: &WorkspaceConfig,
    format: ExportFormat,
    quality: JpegQuality,
) -> Result<ExportedImage> {
    let image = compose::render(
        items,
        workspace.area(),
        workspace.background,
        workspace.export_pixel_ratio(),
    )?;
    let bytes = encode(&image, format, quality)?;
    Ok(ExportedImage {
        format,
        width: image.width(),
        height: image.height(),
        bytes,
    })
}

/// Encodes `image` in memory. `quality` only affects JPEG.
///
/// # Errors
///
/// Returns [`Error::Export`] if the encoder rejects the image.
pub fn encode(image: &RawImage, format: ExportFormat, quality: JpegQuality) -> Result<Vec<u8>> {
    let dynamic = loader::to_dynamic(image)?;
    let mut cursor = Cursor::new(Vec::new());

    match format {
        ExportFormat::Png => dynamic
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| Error::Export(format!("PNG encoding failed: {e}")))?,
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(dynamic.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut cursor, quality.value());
            rgb.write_with_encoder(encoder)
                .map_err(|e| Error::Export(format!("JPEG encoding failed: {e}")))?;
        }
    }

    Ok(cursor.into_inner())
}

/// Generates a timestamped file name for an export made now.
///
/// Format: `collage_{YYYY-MM-DD_HH-MM-SS}.{ext}`
#[must_use]
pub fn default_filename(format: ExportFormat) -> String {
    filename_at(Local::now().naive_local(), format)
}

fn filename_at(timestamp: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "collage_{}.{}",
        timestamp.format("%Y-%m-%d_%H-%M-%S"),
        format.extension()
    )
}
