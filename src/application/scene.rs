// SPDX-License-Identifier: MPL-2.0
//! In-process scene: the ordered collection of canvas items.
//!
//! Draw order is insertion order, so the last item is on top. The scene
//! also tracks a single selection and hands out item ids.

use super::arrange;
use crate::domain::collage::{
    CanvasItem, FrameStyle, ItemId, ItemKind, KindTag, Point, WorkspaceArea,
};
use crate::domain::media::RawImage;

/// Default factor from image pixels to canvas units for new items.
pub const DEFAULT_PLACEMENT_SCALE: f64 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    items: Vec<CanvasItem>,
    selected: Option<ItemId>,
    next_id: u64,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a new item at the origin and returns its id.
    pub fn add(&mut self, image: RawImage, kind: ItemKind, placement_scale: f64) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items
            .push(CanvasItem::new(id, kind, image, placement_scale));
        log::debug!("placed {:?} as {:?}", id, kind.tag());
        id
    }

    #[must_use]
    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut CanvasItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn items_of_kind(&self, tag: KindTag) -> impl Iterator<Item = &CanvasItem> {
        self.items.iter().filter(move |item| item.kind().tag() == tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    /// Topmost item under `point`, in workspace coordinates.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .find(|item| item.contains(point))
            .map(CanvasItem::id)
    }

    /// Selects the item under `point`, or clears the selection when the
    /// click lands on empty canvas.
    pub fn click(&mut self, point: Point) -> Option<ItemId> {
        self.selected = self.hit_test(point);
        self.selected
    }

    /// Selects `id` if it exists. Returns whether the selection changed.
    pub fn select(&mut self, id: ItemId) -> bool {
        if self.get(id).is_none() || self.selected == Some(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn remove(&mut self, id: ItemId) -> Option<CanvasItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.items.remove(index))
    }

    pub fn delete_selected(&mut self) -> Option<CanvasItem> {
        let id = self.selected?;
        self.remove(id)
    }

    /// Applies `frame` to every photo. Returns how many items changed.
    pub fn restyle_photos(&mut self, frame: FrameStyle) -> usize {
        self.items
            .iter_mut()
            .map(|item| item.set_frame(frame))
            .filter(|changed| *changed)
            .count()
    }

    /// Multiplies every position and scale by `factor`, keeping the
    /// composition proportional when the workspace is zoomed.
    pub fn rescale(&mut self, factor: f64) {
        for item in &mut self.items {
            item.transform.x *= factor;
            item.transform.y *= factor;
            item.transform.scale_x *= factor;
            item.transform.scale_y *= factor;
        }
    }

    pub fn arrange(&mut self, area: WorkspaceArea) {
        arrange::arrange(&mut self.items, area);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collage::FrameWidth;
    use crate::test_utils::assert_abs_diff_eq;

    fn photo_kind() -> ItemKind {
        ItemKind::Photo {
            frame: FrameStyle::default(),
        }
    }

    fn scene_with_two_overlapping() -> (Scene, ItemId, ItemId) {
        let mut scene = Scene::new();
        let bottom = scene.add(RawImage::filled(1000, 1000, [0, 0, 0, 255]), photo_kind(), 0.1);
        let top = scene.add(RawImage::filled(500, 500, [0, 0, 0, 255]), ItemKind::Object, 0.1);
        (scene, bottom, top)
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let (scene, bottom, top) = scene_with_two_overlapping();
        assert_ne!(bottom, top);
        assert_eq!(scene.items()[0].id(), bottom);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let (scene, bottom, top) = scene_with_two_overlapping();
        assert_eq!(scene.hit_test(Point::new(10.0, 10.0)), Some(top));
        // Outside the 50x50 object but inside the framed 140x140 photo.
        assert_eq!(scene.hit_test(Point::new(120.0, 120.0)), Some(bottom));
        assert_eq!(scene.hit_test(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn click_on_empty_canvas_clears_selection() {
        let (mut scene, bottom, _) = scene_with_two_overlapping();
        assert_eq!(scene.click(Point::new(120.0, 120.0)), Some(bottom));
        assert_eq!(scene.selected(), Some(bottom));
        assert_eq!(scene.click(Point::new(900.0, 900.0)), None);
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn delete_removes_only_selected() {
        let (mut scene, bottom, top) = scene_with_two_overlapping();
        assert!(scene.delete_selected().is_none());

        assert!(scene.select(top));
        let removed = scene.delete_selected().unwrap();
        assert_eq!(removed.id(), top);
        assert_eq!(scene.len(), 1);
        assert!(scene.get(bottom).is_some());
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn select_unknown_id_is_ignored() {
        let (mut scene, _, _) = scene_with_two_overlapping();
        assert!(!scene.select(ItemId(99)));
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn items_of_kind_filters() {
        let (mut scene, _, _) = scene_with_two_overlapping();
        scene.add(RawImage::filled(10, 10, [0, 0, 0, 255]), photo_kind(), 1.0);
        assert_eq!(scene.items_of_kind(KindTag::Photo).count(), 2);
        assert_eq!(scene.items_of_kind(KindTag::Object).count(), 1);
    }

    #[test]
    fn restyle_touches_photos_only() {
        let (mut scene, bottom, top) = scene_with_two_overlapping();
        let frame = FrameStyle {
            width: FrameWidth::new(5.0),
            ..FrameStyle::default()
        };
        assert_eq!(scene.restyle_photos(frame), 1);
        assert_abs_diff_eq!(scene.get(bottom).unwrap().kind().border(), 5.0);
        assert_abs_diff_eq!(scene.get(top).unwrap().kind().border(), 0.0);
    }

    #[test]
    fn rescale_scales_positions_and_sizes() {
        let (mut scene, bottom, _) = scene_with_two_overlapping();
        scene.get_mut(bottom).unwrap().transform.x = 10.0;
        scene.rescale(2.0);
        let item = scene.get(bottom).unwrap();
        assert_abs_diff_eq!(item.transform.x, 20.0);
        assert_abs_diff_eq!(item.bounding_box().width, 280.0, epsilon = 1e-9);
    }

    #[test]
    fn arrange_keeps_order_and_selection() {
        let (mut scene, bottom, top) = scene_with_two_overlapping();
        scene.select(top);
        scene.arrange(WorkspaceArea::new(400.0, 400.0));
        assert_eq!(scene.items()[0].id(), bottom);
        assert_eq!(scene.items()[1].id(), top);
        assert_eq!(scene.selected(), Some(top));
    }
}
