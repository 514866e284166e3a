// SPDX-License-Identifier: MPL-2.0
//! Image decoding for canvas uploads.
//!
//! Files are decoded with the `image` crate and then turned upright using
//! the EXIF `Orientation` tag when one is present, so that phone photos
//! land on the canvas the way they were shot.

use crate::domain::media::RawImage;
use crate::error::{Error, Result};
use image_rs::{DynamicImage, GenericImageView, ImageReader, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Loads and decodes the image at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Decode`]
/// if its contents are not a supported image.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RawImage> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let image = decode_bytes(&bytes)?;
    log::debug!(
        "decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Decodes an in-memory image, sniffing its format from the content.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the bytes are not a supported image.
pub fn decode_bytes(bytes: &[u8]) -> Result<RawImage> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    let oriented = match read_orientation(bytes) {
        Some(orientation) => apply_orientation(decoded, orientation),
        None => decoded,
    };

    Ok(from_dynamic(oriented))
}

/// Reads the EXIF orientation (1-8) from an encoded image, if any.
fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let mut reader = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

/// Applies an EXIF orientation value to a decoded image.
///
/// Unknown values leave the image untouched.
#[must_use]
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Converts any decoded image into straight-alpha RGBA8.
#[must_use]
pub fn from_dynamic(image: DynamicImage) -> RawImage {
    let (width, height) = image.dimensions();
    let rgba = image.into_rgba8().into_raw();
    // `into_rgba8` always yields a buffer matching the dimensions.
    RawImage::from_rgba(width, height, rgba).unwrap_or_else(|| RawImage::filled(0, 0, [0; 4]))
}

/// Wraps a [`RawImage`] for use with `image` crate operations.
///
/// Copies the pixel data, since `ImageBuffer` needs ownership.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the buffer does not match the dimensions.
pub fn to_dynamic(image: &RawImage) -> Result<DynamicImage> {
    RgbaImage::from_raw(image.width(), image.height(), image.rgba_bytes().to_vec())
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| Error::Decode("RGBA buffer does not match image size".into()))
}
