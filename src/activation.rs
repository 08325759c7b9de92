//! Show/hide decision for a dock.
//!
//! The trigger is a one-pixel-high band on the monitor's top row, centered
//! horizontally, `monitor width × fraction` wide. Both band ends are inclusive.
//! Once shown, a dock stays up while the pointer is anywhere inside the dock
//! rectangle, so the pointer can travel from the band to any button.

use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationBand {
    pub left: f64,
    pub right: f64,
    pub y: i32,
}

impl ActivationBand {
    pub fn for_monitor(monitor: &Rect, fraction: f64) -> Self {
        let width = monitor.width as f64;
        let band_width = width * fraction;
        let left = monitor.x as f64 + (width - band_width) / 2.0;

        Self {
            left,
            right: left + band_width,
            y: monitor.y,
        }
    }

    pub fn contains(&self, pointer: Point) -> bool {
        let x = pointer.x as f64;
        pointer.y == self.y && x >= self.left && x <= self.right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityDecision {
    Show,
    Hide,
    /// Pointer is inside the dock but outside the band: keep whatever state the dock has
    Keep,
}

pub fn decide(monitor: &Rect, dock: &Rect, fraction: f64, pointer: Point) -> VisibilityDecision {
    if ActivationBand::for_monitor(monitor, fraction).contains(pointer) {
        VisibilityDecision::Show
    } else if !dock.contains(pointer) {
        VisibilityDecision::Hide
    } else {
        VisibilityDecision::Keep
    }
}
