//! Common traits for the platform seams
//!
//! The dock model and manager only talk to windows, monitors and processes
//! through these traits, so the Win32 backend, the unsupported-platform stub
//! and the test fakes are interchangeable.

use anyhow::Result;
use std::path::Path;
use tiny_skia::Pixmap;

use crate::geometry::{Point, Rect};
use crate::monitors::MonitorInfo;

/// Platform handle value of a surface (the HWND on Windows)
pub type SurfaceId = isize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Arrow,
    Hand,
}

/// Borderless, always-on-top, non-activating window backing one dock strip
pub trait DockSurface {
    /// Platform handle, used to route pointer events back to the owning dock
    fn id(&self) -> SurfaceId;

    /// Replace the window contents with `frame` (same size as the dock)
    fn present(&self, frame: &Pixmap);

    fn show(&self);

    fn hide(&self);

    /// Cursor shown while the pointer is over this surface
    fn set_cursor(&self, cursor: CursorShape);
}

/// Floating text overlay under a dock
pub trait HoverLabelSurface {
    /// Move to (x, y) in screen coordinates, resize to `frame` and show it
    fn show_at(&self, x: i32, y: i32, frame: &Pixmap);

    fn hide(&self);
}

/// Everything the manager needs from the windowing system
pub trait DisplayServer {
    /// Currently connected monitors
    fn monitors(&self) -> Result<Vec<MonitorInfo>>;

    /// Global pointer position, `None` when it can't be read (secure desktop, ...)
    fn cursor_position(&self) -> Option<Point>;

    fn create_dock_surface(&self, rect: Rect) -> Result<Box<dyn DockSurface>>;

    fn create_label_surface(&self) -> Result<Box<dyn HoverLabelSurface>>;
}

/// Starts a shortcut's target
pub trait AppLauncher {
    fn launch(&self, path: &Path) -> Result<()>;
}
