//! Per-monitor dock: button row, visibility and hover state.
//!
//! A dock owns its platform surface and hover label; dropping it destroys both.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::Pixmap;

use crate::config;
use crate::geometry::{Point, Rect};
use crate::icon::IconResolver;
use crate::layout;
use crate::monitors::MonitorInfo;
use crate::render::DockPainter;
use crate::settings::{DockSettings, Shortcut};
use crate::traits::{CursorShape, DockSurface, HoverLabelSurface, SurfaceId};

/// A shortcut with its icon resolved, shared by every dock
#[derive(Clone)]
pub enum ResolvedShortcut {
    Launcher {
        name: String,
        target: PathBuf,
        icon: Arc<Pixmap>,
    },
    Spacer,
}

/// Resolve every launcher's icon once, in configuration order
pub fn resolve_shortcuts(settings: &DockSettings, resolver: &dyn IconResolver) -> Vec<ResolvedShortcut> {
    settings
        .shortcuts
        .iter()
        .map(|shortcut| match shortcut {
            Shortcut::Spacer => ResolvedShortcut::Spacer,
            Shortcut::Launcher(launcher) => ResolvedShortcut::Launcher {
                name: launcher.name.clone(),
                target: launcher.path.clone(),
                icon: Arc::new(resolver.resolve_icon(
                    &launcher.name,
                    launcher.icon_path.as_deref(),
                    Some(&launcher.path),
                )),
            },
        })
        .collect()
}

/// Launcher button inside one dock. `rect` is dock-local.
#[derive(Clone)]
pub struct LauncherButton {
    pub name: String,
    pub target: PathBuf,
    pub icon: Arc<Pixmap>,
    pub rect: Rect,
}

pub struct Dock {
    monitor: MonitorInfo,
    rect: Rect,
    visible: bool,
    buttons: Vec<LauncherButton>,
    hovered: Option<usize>,
    surface: Box<dyn DockSurface>,
    label: Box<dyn HoverLabelSurface>,
    painter: Arc<DockPainter>,
}

impl Dock {
    /// Full monitor width, one button tall, glued to the monitor's top edge
    pub fn rect_for_monitor(monitor: &MonitorInfo, height: u32) -> Rect {
        Rect::new(monitor.rect.x, monitor.rect.y, monitor.rect.width, height)
    }

    /// New docks start hidden
    pub fn new(
        monitor: MonitorInfo,
        settings: &DockSettings,
        shortcuts: &[ResolvedShortcut],
        surface: Box<dyn DockSurface>,
        label: Box<dyn HoverLabelSurface>,
        painter: Arc<DockPainter>,
    ) -> Self {
        let rect = Self::rect_for_monitor(&monitor, settings.dock_height());
        let slots = layout::layout_slots(shortcuts.len(), settings.button_footprint(), rect.width);

        // Spacers keep their slot but produce no button
        let buttons = shortcuts
            .iter()
            .zip(slots)
            .filter_map(|(shortcut, slot)| match shortcut {
                ResolvedShortcut::Spacer => None,
                ResolvedShortcut::Launcher { name, target, icon } => Some(LauncherButton {
                    name: name.clone(),
                    target: target.clone(),
                    icon: Arc::clone(icon),
                    rect: slot,
                }),
            })
            .collect();

        Self {
            monitor,
            rect,
            visible: false,
            buttons,
            hovered: None,
            surface,
            label,
            painter,
        }
    }

    pub fn monitor(&self) -> &MonitorInfo {
        &self.monitor
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn buttons(&self) -> &[LauncherButton] {
        &self.buttons
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface.id()
    }

    /// Returns `false` (and touches nothing) when already visible
    pub fn show(&mut self) -> bool {
        if self.visible {
            return false;
        }
        self.visible = true;
        self.repaint();
        self.surface.show();
        tracing::debug!(monitor = %self.monitor.id, "Dock shown");
        true
    }

    /// Hides the dock and its hover label. Returns `false` (and touches
    /// nothing) when already hidden.
    pub fn hide(&mut self) -> bool {
        if !self.visible {
            return false;
        }
        self.visible = false;
        self.hovered = None;
        self.label.hide();
        self.surface.set_cursor(CursorShape::Arrow);
        self.surface.hide();
        tracing::debug!(monitor = %self.monitor.id, "Dock hidden");
        true
    }

    /// Explicit hit-test against every button rectangle, so the first and last
    /// pixel rows of the strip resolve like any other row
    pub fn button_at(&self, local: Point) -> Option<usize> {
        self.buttons.iter().position(|b| b.rect.contains(local))
    }

    pub fn pointer_moved(&mut self, local: Point) {
        if !self.visible {
            return;
        }
        let hit = self.button_at(local);
        if hit != self.hovered {
            self.set_hovered(hit);
        }
    }

    pub fn pointer_left(&mut self) {
        if self.hovered.is_some() {
            self.set_hovered(None);
        }
    }

    /// Launch target under a press, if it hit a button
    pub fn pointer_pressed(&self, local: Point) -> Option<&Path> {
        if !self.visible {
            return None;
        }
        self.button_at(local)
            .map(|i| self.buttons[i].target.as_path())
    }

    fn set_hovered(&mut self, hovered: Option<usize>) {
        self.hovered = hovered;
        self.surface.set_cursor(if hovered.is_some() {
            CursorShape::Hand
        } else {
            CursorShape::Arrow
        });
        self.repaint();

        match hovered.and_then(|i| self.buttons.get(i)) {
            Some(button) => self.show_label(button),
            None => self.label.hide(),
        }
    }

    fn show_label(&self, button: &LauncherButton) {
        let Some(frame) = self.painter.render_label(&button.name) else {
            self.label.hide();
            return;
        };

        let anchor = self.rect.x + button.rect.x + button.rect.width as i32 / 2;
        let x = layout::centered_clamped(
            anchor,
            frame.width(),
            self.monitor.rect.x,
            self.monitor.rect.right(),
        );
        let y = self.rect.bottom() + config::label::GAP_BELOW_DOCK;
        self.label.show_at(x, y, &frame);
    }

    fn repaint(&self) {
        match self
            .painter
            .render_dock(self.rect.width, self.rect.height, &self.buttons, self.hovered)
        {
            Some(frame) => self.surface.present(&frame),
            None => tracing::warn!(
                monitor = %self.monitor.id,
                width = self.rect.width,
                height = self.rect.height,
                "Dock size can't be rendered"
            ),
        }
    }
}

impl Drop for Dock {
    fn drop(&mut self) {
        self.label.hide();
        self.surface.hide();
        tracing::debug!(monitor = %self.monitor.id, "Dock destroyed");
    }
}
