// SPDX-License-Identifier: MPL-2.0
//! Grid auto-arrangement of canvas items.
//!
//! Items are distributed over a near-square grid covering the workspace:
//!
//! - `rows = ceil(sqrt(n))`, `columns = ceil(n / rows)`
//! - rows split the width and columns split the height, so a cell is
//!   `round(width / rows)` wide and `round(height / columns)` tall
//! - item `i` goes to column `i % rows` of row `i / rows`
//!
//! Each item is scaled so its height fills the cell while keeping its
//! current aspect ratio. Wide items may overflow their cell horizontally.
//! A small random rotation gives the "photos on a table" look.

use crate::domain::collage::{CanvasItem, Point, WorkspaceArea};
use rand::Rng;

/// Largest rotation applied by the jitter, in degrees, either direction.
pub const MAX_JITTER_DEG: f64 = 2.0;

/// Row/column partition and cell size for a given item count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: usize,
    pub columns: usize,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl GridLayout {
    /// Computes the grid for `count` items, or `None` when there is nothing
    /// to place.
    #[must_use]
    pub fn for_count(count: usize, area: WorkspaceArea) -> Option<Self> {
        if count == 0 {
            return None;
        }

        // Item counts are far below 2^52, so the float round-trip is exact.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rows = (count as f64).sqrt().ceil() as usize;
        let columns = count.div_ceil(rows);

        Some(Self {
            rows,
            columns,
            cell_width: (area.width / rows as f64).round(),
            cell_height: (area.height / columns as f64).round(),
        })
    }

    /// Top-left corner of the cell assigned to item `index`.
    #[must_use]
    pub fn cell_origin(&self, index: usize) -> Point {
        let col = index % self.rows;
        let row = index / self.rows;
        Point::new(
            col as f64 * self.cell_width,
            row as f64 * self.cell_height,
        )
    }
}

/// Arranges `items` in a grid over `area`, mutating their transforms.
///
/// Positions and scales are a pure function of the items' current aspect
/// ratios and the area; rotations are drawn fresh on every call.
pub fn arrange(items: &mut [CanvasItem], area: WorkspaceArea) {
    let mut rng = rand::thread_rng();
    arrange_with(items, area, || {
        rng.gen_range(-MAX_JITTER_DEG..=MAX_JITTER_DEG)
    });
}

fn arrange_with(items: &mut [CanvasItem], area: WorkspaceArea, mut jitter: impl FnMut() -> f64) {
    let Some(layout) = GridLayout::for_count(items.len(), area) else {
        return;
    };

    for (index, item) in items.iter_mut().enumerate() {
        let current = item.bounding_box();
        let aspect = current.width / current.height;
        let intrinsic = item.intrinsic_size();

        // Height drives the fit; zero-height items are not guarded against.
        item.transform.scale_y = layout.cell_height / intrinsic.height;
        item.transform.scale_x = layout.cell_height * aspect / intrinsic.width;

        let bounds = item.bounding_box();
        let origin = layout.cell_origin(index);
        item.transform.x = origin.x + layout.cell_width / 2.0 - bounds.width / 2.0;
        item.transform.y = origin.y + layout.cell_height / 2.0 - bounds.height / 2.0;
        item.transform.rotation_deg = jitter();
    }

    log::debug!(
        "arranged {} items in {}x{} grid, cell {}x{}",
        items.len(),
        layout.rows,
        layout.columns,
        layout.cell_width,
        layout.cell_height
    );
}
