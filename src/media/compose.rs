// SPDX-License-Identifier: MPL-2.0
//! Rasterisation of the workspace with `tiny-skia`.
//!
//! Every item is drawn in its own local space (origin at the top-left of
//! its unscaled box, frame included), then mapped to the output through:
//!
//! 1. the item's scale,
//! 2. its rotation about the centre of the scaled box,
//! 3. its translation to `(x, y)`,
//! 4. the export pixel ratio.
//!
//! Photos get an optional blurred offset shadow, a frame rectangle and the
//! image inset by the border. Objects are drawn as-is, alpha included.

use crate::domain::collage::{
    CanvasItem, Color, ItemKind, WorkspaceArea, SHADOW_BLUR, SHADOW_OFFSET, SHADOW_OPACITY,
};
use crate::domain::media::RawImage;
use crate::error::{Error, Result};
use tiny_skia::{
    FilterQuality, IntSize, Paint, Pixmap, PixmapPaint, Point as SkiaPoint, Rect as SkiaRect,
    Transform,
};

/// Renders `items` over a filled background.
///
/// The output is `round(area * pixel_ratio)` pixels in each direction.
///
/// # Errors
///
/// Returns [`Error::Export`] if the output size is zero or too large to
/// allocate.
pub fn render(
    items: &[CanvasItem],
    area: WorkspaceArea,
    background: Color,
    pixel_ratio: f64,
) -> Result<RawImage> {
    let (width, height) = output_size(area, pixel_ratio);
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        Error::Export(format!("cannot allocate a {width}x{height} canvas"))
    })?;
    pixmap.fill(skia_color(background));

    for item in items {
        draw_item(&mut pixmap, item, pixel_ratio);
    }

    log::debug!(
        "rendered {} items at {}x{} (ratio {pixel_ratio})",
        items.len(),
        width,
        height
    );
    Ok(into_raw_image(&pixmap))
}

/// Pixel dimensions of a render of `area` at `pixel_ratio`.
#[must_use]
pub fn output_size(area: WorkspaceArea, pixel_ratio: f64) -> (u32, u32) {
    // Negative or NaN products saturate to 0 and are rejected by the caller.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let size = (
        (area.width * pixel_ratio).round() as u32,
        (area.height * pixel_ratio).round() as u32,
    );
    size
}

// =============================================================================
// Item drawing
// =============================================================================

fn draw_item(pixmap: &mut Pixmap, item: &CanvasItem, pixel_ratio: f64) {
    let transform = item_transform(item, pixel_ratio);
    let intrinsic = item.intrinsic_size();
    let content = item.content_size();

    // Canvas units comfortably fit in f32.
    #[allow(clippy::cast_possible_truncation)]
    let (box_w, box_h, content_w, content_h) = (
        intrinsic.width as f32,
        intrinsic.height as f32,
        content.width as f32,
        content.height as f32,
    );

    let inset = match item.kind() {
        ItemKind::Photo { frame } => {
            if frame.shadow {
                draw_shadow(pixmap, box_w, box_h, transform, pixel_ratio);
            }
            fill_box(pixmap, 0.0, 0.0, box_w, box_h, frame.color, transform);
            #[allow(clippy::cast_possible_truncation)]
            let border = frame.width.value() as f32;
            border
        }
        ItemKind::Object => 0.0,
    };

    let Some(source) = to_pixmap(item.image()) else {
        return;
    };

    #[allow(clippy::cast_precision_loss)]
    let (source_w, source_h) = (source.width() as f32, source.height() as f32);
    let image_transform = Transform::from_scale(content_w / source_w, content_h / source_h)
        .post_translate(inset, inset)
        .post_concat(transform);

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, image_transform, None);
}

/// Fills the offset shadow box into a padded layer, blurs the layer and
/// composites it under the item.
fn draw_shadow(
    pixmap: &mut Pixmap,
    box_w: f32,
    box_h: f32,
    transform: Transform,
    pixel_ratio: f64,
) {
    #[allow(clippy::cast_possible_truncation)]
    let (dx, dy, sigma) = (
        SHADOW_OFFSET.0 as f32,
        SHADOW_OFFSET.1 as f32,
        (SHADOW_BLUR / 2.0 * pixel_ratio) as f32,
    );
    let pad = (sigma * 3.0).ceil();

    let mut corners = [
        SkiaPoint::from_xy(dx, dy),
        SkiaPoint::from_xy(dx + box_w, dy),
        SkiaPoint::from_xy(dx, dy + box_h),
        SkiaPoint::from_xy(dx + box_w, dy + box_h),
    ];
    transform.map_points(&mut corners);

    #[allow(clippy::cast_precision_loss)]
    let (canvas_w, canvas_h) = (pixmap.width() as f32, pixmap.height() as f32);
    let left = (corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min) - pad)
        .floor()
        .max(-pad);
    let top = (corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min) - pad)
        .floor()
        .max(-pad);
    let right = (corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max) + pad)
        .ceil()
        .min(canvas_w + pad);
    let bottom = (corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max) + pad)
        .ceil()
        .min(canvas_h + pad);
    if !(right > left && bottom > top) {
        return;
    }

    // Bounds are whole numbers within the canvas plus padding.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (layer_w, layer_h) = ((right - left) as u32, (bottom - top) as u32);
    let Some(mut layer) = Pixmap::new(layer_w, layer_h) else {
        return;
    };
    let shadow = Color::BLACK.with_opacity(SHADOW_OPACITY);
    fill_box(
        &mut layer,
        dx,
        dy,
        box_w,
        box_h,
        shadow,
        transform.post_translate(-left, -top),
    );

    let Some(blurred) = blur(layer, sigma) else {
        return;
    };
    #[allow(clippy::cast_possible_truncation)]
    let (x, y) = (left as i32, top as i32);
    pixmap.draw_pixmap(
        x,
        y,
        blurred.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

/// Gaussian blur of a premultiplied layer. Blurring is linear, so it is
/// applied to premultiplied channels directly.
fn blur(layer: Pixmap, sigma: f32) -> Option<Pixmap> {
    if sigma <= 0.0 {
        return Some(layer);
    }
    let size = IntSize::from_wh(layer.width(), layer.height())?;
    let buffer = image_rs::RgbaImage::from_raw(size.width(), size.height(), layer.take())?;
    let blurred = image_rs::imageops::blur(&buffer, sigma);
    Pixmap::from_vec(blurred.into_raw(), size)
}

/// Local item space to output pixels.
fn item_transform(item: &CanvasItem, pixel_ratio: f64) -> Transform {
    let t = item.transform;
    let bounds = item.bounding_box();

    #[allow(clippy::cast_possible_truncation)]
    let transform = Transform::from_scale(t.scale_x as f32, t.scale_y as f32)
        .post_rotate_at(
            t.rotation_deg as f32,
            (bounds.width / 2.0) as f32,
            (bounds.height / 2.0) as f32,
        )
        .post_translate(t.x as f32, t.y as f32)
        .post_scale(pixel_ratio as f32, pixel_ratio as f32);
    transform
}

fn fill_box(
    pixmap: &mut Pixmap,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: Color,
    transform: Transform,
) {
    let Some(rect) = SkiaRect::from_xywh(x, y, width, height) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    pixmap.fill_rect(rect, &paint, transform, None);
}

// =============================================================================
// Pixel conversion
// =============================================================================

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Straight RGBA to tiny-skia's premultiplied RGBA.
fn to_pixmap(image: &RawImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = Vec::with_capacity(image.rgba_bytes().len());
    for pixel in image.rgba_bytes().chunks_exact(4) {
        let alpha = u16::from(pixel[3]);
        for &channel in &pixel[..3] {
            // (c * a + 127) / 255 stays within u8.
            #[allow(clippy::cast_possible_truncation)]
            data.push(((u16::from(channel) * alpha + 127) / 255) as u8);
        }
        data.push(pixel[3]);
    }
    Pixmap::from_vec(data, size)
}

fn into_raw_image(pixmap: &Pixmap) -> RawImage {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RawImage::from_rgba(pixmap.width(), pixmap.height(), rgba)
        .unwrap_or_else(|| RawImage::filled(0, 0, [0; 4]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collage::{FrameStyle, ItemId};
    use crate::test_utils::photo_item;

    fn pixel(image: &RawImage, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * image.width() + x) * 4) as usize;
        let bytes = &image.rgba_bytes()[offset..offset + 4];
        [bytes[0], bytes[1], bytes[2], bytes[3]]
    }

    fn object_at(x: f64, y: f64, rgba: [u8; 4]) -> CanvasItem {
        let mut item = CanvasItem::new(ItemId(7), ItemKind::Object, RawImage::filled(20, 20, rgba), 1.0);
        item.transform.x = x;
        item.transform.y = y;
        item
    }

    fn red_object(x: f64, y: f64) -> CanvasItem {
        object_at(x, y, [255, 0, 0, 255])
    }

    #[test]
    fn empty_scene_is_background_only() {
        let image = render(&[], WorkspaceArea::new(8.0, 4.0), Color::SLATE, 1.0).unwrap();
        assert_eq!((image.width(), image.height()), (8, 4));
        assert_eq!(pixel(&image, 3, 2), [0x85, 0x98, 0xA9, 0xFF]);
    }

    #[test]
    fn output_is_scaled_by_pixel_ratio() {
        let image = render(&[], WorkspaceArea::new(50.0, 30.0), Color::BLACK, 2.0).unwrap();
        assert_eq!((image.width(), image.height()), (100, 60));
        assert_eq!(output_size(WorkspaceArea::new(100.5, 10.2), 1.0), (101, 10));
    }

    #[test]
    fn zero_sized_output_is_an_error() {
        let result = render(&[], WorkspaceArea::new(0.0, 10.0), Color::BLACK, 1.0);
        assert!(matches!(result, Err(Error::Export(_))));
    }

    #[test]
    fn object_is_drawn_at_its_position() {
        let items = [red_object(10.0, 10.0)];
        let image = render(&items, WorkspaceArea::new(50.0, 50.0), Color::BLACK, 1.0).unwrap();
        assert_eq!(pixel(&image, 20, 20), [255, 0, 0, 255]);
        assert_eq!(pixel(&image, 2, 2), [0, 0, 0, 255]);
        assert_eq!(pixel(&image, 40, 40), [0, 0, 0, 255]);
    }

    #[test]
    fn pixel_ratio_scales_item_positions() {
        let items = [red_object(10.0, 10.0)];
        let image = render(&items, WorkspaceArea::new(50.0, 50.0), Color::BLACK, 2.0).unwrap();
        assert_eq!(pixel(&image, 40, 40), [255, 0, 0, 255]);
        assert_eq!(pixel(&image, 15, 15), [0, 0, 0, 255]);
    }

    #[test]
    fn photo_has_frame_image_and_shadow() {
        // 100x100 content, 20 border -> 140x140 box at the origin.
        let items = [photo_item(1, 100, 100)];
        let image = render(&items, WorkspaceArea::new(200.0, 200.0), Color::SLATE, 1.0).unwrap();

        assert_eq!(pixel(&image, 5, 5), [255, 255, 255, 255]);
        assert_eq!(pixel(&image, 70, 70), [200, 120, 40, 255]);

        let shadowed = pixel(&image, 141, 143);
        assert!(shadowed[0] < 0x85 && shadowed[2] < 0xA9, "got {shadowed:?}");
        assert_eq!(pixel(&image, 190, 190), [0x85, 0x98, 0xA9, 0xFF]);
    }

    #[test]
    fn shadow_edge_is_soft() {
        // The unblurred shadow ends at x = 142; blur spills past it.
        let items = [photo_item(1, 100, 100)];
        let image = render(&items, WorkspaceArea::new(200.0, 200.0), Color::SLATE, 1.0).unwrap();

        let spill = pixel(&image, 143, 100);
        assert!(spill[0] < 0x85, "got {spill:?}");
        let inner = pixel(&image, 139, 143);
        assert!(inner[0] < spill[0], "inner {inner:?} spill {spill:?}");
        assert_eq!(pixel(&image, 160, 100), [0x85, 0x98, 0xA9, 0xFF]);
    }

    #[test]
    fn photo_without_shadow_leaves_background() {
        let mut item = photo_item(1, 100, 100);
        item.set_frame(FrameStyle {
            shadow: false,
            ..FrameStyle::default()
        });
        let image = render(&[item], WorkspaceArea::new(200.0, 200.0), Color::SLATE, 1.0).unwrap();
        assert_eq!(pixel(&image, 141, 143), [0x85, 0x98, 0xA9, 0xFF]);
    }

    #[test]
    fn later_items_draw_on_top() {
        let items = [red_object(0.0, 0.0), object_at(10.0, 10.0, [0, 0, 255, 255])];
        let image = render(&items, WorkspaceArea::new(40.0, 40.0), Color::BLACK, 1.0).unwrap();
        assert_eq!(pixel(&image, 15, 15), [0, 0, 255, 255]);
        assert_eq!(pixel(&image, 5, 5), [255, 0, 0, 255]);
    }

    #[test]
    fn premultiply_round_trips_opaque_pixels() {
        let source = RawImage::filled(2, 2, [12, 34, 56, 255]);
        let pixmap = to_pixmap(&source).unwrap();
        assert_eq!(into_raw_image(&pixmap), source);
    }
}
