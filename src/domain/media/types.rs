// SPDX-License-Identifier: MPL-2.0
//! Decoded image data for the domain layer.
//!
//! These types carry pixels only; encoding, decoding and rasterisation live
//! in the `media` module.

use std::sync::Arc;

/// Decoded RGBA8 image, straight (non-premultiplied) alpha.
///
/// Pixel storage is shared so that a single decoded photo can back a canvas
/// item, a background-removal job and a render pass without copies.
///
/// # Example
///
/// ```
/// use collage_lens::domain::media::RawImage;
///
/// let image = RawImage::from_rgba(2, 1, vec![255u8; 8]).unwrap();
///
/// assert_eq!(image.width(), 2);
/// assert_eq!(image.height(), 1);
/// assert!((image.aspect_ratio() - 2.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone)]
pub struct RawImage {
    width: u32,
    height: u32,
    rgba_bytes: Arc<Vec<u8>>,
}

impl RawImage {
    /// Wraps shared RGBA data, returning `None` when the buffer length does
    /// not match `width * height * 4`.
    #[must_use]
    pub fn new(width: u32, height: u32, rgba_bytes: Arc<Vec<u8>>) -> Option<Self> {
        let expected_len = (width as usize) * (height as usize) * 4;
        if rgba_bytes.len() != expected_len {
            return None;
        }

        Some(Self {
            width,
            height,
            rgba_bytes,
        })
    }

    /// Same as [`RawImage::new`] for an owned buffer.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, rgba_bytes: Vec<u8>) -> Option<Self> {
        Self::new(width, height, Arc::new(rgba_bytes))
    }

    /// Creates an image filled with a single colour.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            rgba_bytes: Arc::new(data),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn rgba_bytes(&self) -> &[u8] {
        &self.rgba_bytes
    }

    /// Returns the shared reference to the RGBA pixel data.
    #[must_use]
    pub fn rgba_bytes_arc(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.rgba_bytes)
    }

    /// Width divided by height. Degenerate images yield a non-finite value.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Returns `true` if any pixel is not fully opaque.
    #[must_use]
    pub fn has_transparency(&self) -> bool {
        self.rgba_bytes.chunks_exact(4).any(|px| px[3] != u8::MAX)
    }
}

impl PartialEq for RawImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.rgba_bytes == other.rgba_bytes
    }
}

impl Eq for RawImage {}
