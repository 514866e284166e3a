// SPDX-License-Identifier: MPL-2.0
//! Canvas items: photos with a frame and background-free objects.

use super::color::Color;
use super::geometry::{Point, Rect, Size};
use super::newtypes::FrameWidth;
use crate::domain::media::RawImage;

/// Default drop-shadow offset, canvas units.
pub const SHADOW_OFFSET: (f64, f64) = (2.0, 5.0);
/// Default drop-shadow opacity.
pub const SHADOW_OPACITY: f32 = 0.25;
/// Default drop-shadow blur radius, canvas units.
pub const SHADOW_BLUR: f64 = 4.0;

/// Stable identifier for an item inside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// Visual styling of the border drawn around a photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStyle {
    pub color: Color,
    pub width: FrameWidth,
    pub shadow: bool,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            width: FrameWidth::default(),
            shadow: true,
        }
    }
}

/// What an item is, fixed when it is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemKind {
    /// A regular photo, drawn inside a frame.
    Photo { frame: FrameStyle },
    /// A cut-out with its background removed; drawn without a frame.
    Object,
}

impl ItemKind {
    #[must_use]
    pub fn tag(&self) -> KindTag {
        match self {
            ItemKind::Photo { .. } => KindTag::Photo,
            ItemKind::Object => KindTag::Object,
        }
    }

    /// Border thickness on each side; zero for objects.
    #[must_use]
    pub fn border(&self) -> f64 {
        match self {
            ItemKind::Photo { frame } => frame.width.value(),
            ItemKind::Object => 0.0,
        }
    }
}

/// Payload-free discriminant of [`ItemKind`], used for enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Photo,
    Object,
}

/// Position, scale and rotation of an item.
///
/// `(x, y)` is the top-left corner of the unrotated, scaled bounding box.
/// Rotation is applied around the centre of that box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation_deg: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation_deg: 0.0,
        }
    }
}

/// A photo or object placed on the canvas.
#[derive(Debug, Clone)]
pub struct CanvasItem {
    id: ItemId,
    kind: ItemKind,
    image: RawImage,
    /// Displayed size of the image content at scale 1, without the frame.
    content_size: Size,
    pub transform: Transform,
}

impl CanvasItem {
    /// Creates an item at the origin, unscaled and unrotated.
    ///
    /// `placement_scale` maps image pixels to canvas units.
    #[must_use]
    pub fn new(id: ItemId, kind: ItemKind, image: RawImage, placement_scale: f64) -> Self {
        let content_size = Size::new(
            f64::from(image.width()) * placement_scale,
            f64::from(image.height()) * placement_scale,
        );
        Self {
            id,
            kind,
            image,
            content_size,
            transform: Transform::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    #[must_use]
    pub fn image(&self) -> &RawImage {
        &self.image
    }

    #[must_use]
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Replaces the frame of a photo. Objects are left untouched and
    /// `false` is returned.
    pub fn set_frame(&mut self, frame: FrameStyle) -> bool {
        match &mut self.kind {
            ItemKind::Photo { frame: current } => {
                *current = frame;
                true
            }
            ItemKind::Object => false,
        }
    }

    /// Size at scale 1, including the frame border on both sides.
    #[must_use]
    pub fn intrinsic_size(&self) -> Size {
        let border = self.kind.border() * 2.0;
        Size::new(
            self.content_size.width + border,
            self.content_size.height + border,
        )
    }

    /// Current unrotated bounding box in canvas units.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        let intrinsic = self.intrinsic_size();
        Rect::new(
            self.transform.x,
            self.transform.y,
            intrinsic.width * self.transform.scale_x,
            intrinsic.height * self.transform.scale_y,
        )
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform.x += dx;
        self.transform.y += dy;
    }

    /// Multiplies both scales by `factor` while keeping the box centre in
    /// place. Non-positive or non-finite factors are ignored and `false` is
    /// returned.
    pub fn scale_about_center(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let before = self.bounding_box().center();
        self.transform.scale_x *= factor;
        self.transform.scale_y *= factor;
        let after = self.bounding_box();
        self.transform.x = before.x - after.width / 2.0;
        self.transform.y = before.y - after.height / 2.0;
        true
    }

    /// Adds `degrees` to the rotation, normalised to `(-180, 180]`.
    pub fn rotate(&mut self, degrees: f64) {
        let mut rotation = (self.transform.rotation_deg + degrees) % 360.0;
        if rotation > 180.0 {
            rotation -= 360.0;
        } else if rotation <= -180.0 {
            rotation += 360.0;
        }
        self.transform.rotation_deg = rotation;
    }

    /// Hit-test against the rotated bounding box.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let bounds = self.bounding_box();
        let local = point.rotated_around(bounds.center(), -self.transform.rotation_deg);
        bounds.contains(local)
    }
}
