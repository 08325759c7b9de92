//! Button row layout inside a dock.
//!
//! Every shortcut, spacers included, takes one square footprint. The row is
//! centered; a row wider than the dock starts at x = 0 and is clipped on the right.

use crate::geometry::Rect;

/// Dock-local rectangles for `count` consecutive footprints
pub fn layout_slots(count: usize, footprint: u32, dock_width: u32) -> Vec<Rect> {
    let total = footprint as u64 * count as u64;
    let start_x = if total <= dock_width as u64 {
        ((dock_width as u64 - total) / 2) as i32
    } else {
        0
    };

    (0..count)
        .map(|i| Rect::new(start_x + (i as u32 * footprint) as i32, 0, footprint, footprint))
        .collect()
}

/// Top-left corner of an icon centered in its slot
pub fn icon_origin(slot: &Rect, icon_size: u32) -> (i32, i32) {
    let inset_x = (slot.width as i32 - icon_size as i32) / 2;
    let inset_y = (slot.height as i32 - icon_size as i32) / 2;
    (slot.x + inset_x, slot.y + inset_y)
}

/// Left edge for a label of `label_width` centered under `anchor_center_x`,
/// kept inside [min_x, max_x)
pub fn centered_clamped(anchor_center_x: i32, label_width: u32, min_x: i32, max_x: i32) -> i32 {
    let left = anchor_center_x - label_width as i32 / 2;
    let right_limit = max_x - label_width as i32;
    if right_limit < min_x {
        return min_x;
    }
    left.clamp(min_x, right_limit)
}
