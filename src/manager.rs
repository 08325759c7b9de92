//! Dock manager: one dock per connected monitor, plus the show/hide poll.
//!
//! Everything here runs on the UI thread. Platform callbacks never mutate the
//! dock list directly; monitor changes are queued and applied between ticks.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use crate::activation::{self, VisibilityDecision};
use crate::dock::{self, Dock, ResolvedShortcut};
use crate::geometry::Point;
use crate::icon::IconResolver;
use crate::monitors::{self, MonitorInfo};
use crate::render::DockPainter;
use crate::settings::DockSettings;
use crate::traits::{AppLauncher, DisplayServer, SurfaceId};

/// Buffered monitor add/remove request
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorChange {
    Added(MonitorInfo),
    Removed(MonitorInfo),
}

/// Events the platform loop feeds into the manager.
/// Pointer positions are local to the surface that reported them.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    Tick,
    DisplaysChanged,
    PointerMoved { surface: SurfaceId, position: Point },
    PointerLeft { surface: SurfaceId },
    PointerPressed { surface: SurfaceId, position: Point },
}

pub struct DockManager {
    settings: Arc<DockSettings>,
    shortcuts: Vec<ResolvedShortcut>,
    painter: Arc<DockPainter>,
    launcher: Box<dyn AppLauncher>,
    docks: Vec<Dock>,
    pending: VecDeque<MonitorChange>,
}

impl DockManager {
    /// Icons are resolved here, once, and shared by every dock created later
    pub fn new(
        settings: Arc<DockSettings>,
        resolver: &dyn IconResolver,
        painter: Arc<DockPainter>,
        launcher: Box<dyn AppLauncher>,
    ) -> Self {
        let shortcuts = dock::resolve_shortcuts(&settings, resolver);
        tracing::info!(
            shortcuts = shortcuts.len(),
            launchers = settings.launchers().count(),
            "Shortcuts resolved"
        );

        Self {
            settings,
            shortcuts,
            painter,
            launcher,
            docks: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn docks(&self) -> &[Dock] {
        &self.docks
    }

    pub fn settings(&self) -> &DockSettings {
        &self.settings
    }

    /// Create one dock per monitor connected right now
    pub fn start(&mut self, server: &dyn DisplayServer) -> Result<()> {
        let monitors = server
            .monitors()
            .context("Failed to enumerate monitors at startup")?;
        tracing::info!(count = monitors.len(), "Creating docks");

        for monitor in monitors {
            self.queue_change(MonitorChange::Added(monitor));
        }
        self.apply_pending(server);
        Ok(())
    }

    pub fn queue_change(&mut self, change: MonitorChange) {
        tracing::debug!(?change, "Monitor change queued");
        self.pending.push_back(change);
    }

    /// Re-enumerate monitors and queue whatever differs from the docks we have
    pub fn sync_monitors(&mut self, server: &dyn DisplayServer) -> Result<()> {
        let current = server
            .monitors()
            .context("Failed to enumerate monitors after display change")?;
        let known: Vec<MonitorInfo> = self.docks.iter().map(|d| d.monitor().clone()).collect();

        let delta = monitors::diff(&known, &current);
        if delta.is_empty() {
            tracing::debug!("Display change left monitors unchanged");
            return Ok(());
        }

        tracing::info!(
            added = delta.added.len(),
            removed = delta.removed.len(),
            "Monitor configuration changed"
        );
        // Removals first so a replaced descriptor never coexists with its successor
        for monitor in delta.removed {
            self.queue_change(MonitorChange::Removed(monitor));
        }
        for monitor in delta.added {
            self.queue_change(MonitorChange::Added(monitor));
        }
        Ok(())
    }

    /// Drain the change queue. Failures to create a dock are logged and skipped.
    pub fn apply_pending(&mut self, server: &dyn DisplayServer) {
        while let Some(change) = self.pending.pop_front() {
            match change {
                MonitorChange::Added(monitor) => {
                    if let Err(e) = self.add_monitor(monitor.clone(), server) {
                        tracing::error!(monitor = %monitor.id, error = %e, "Failed to create dock");
                    }
                }
                MonitorChange::Removed(monitor) => {
                    self.remove_monitor(&monitor);
                }
            }
        }
    }

    /// Returns `Ok(false)` when the monitor already has a dock
    pub fn add_monitor(&mut self, monitor: MonitorInfo, server: &dyn DisplayServer) -> Result<bool> {
        if self.docks.iter().any(|d| d.monitor().same_descriptor(&monitor)) {
            tracing::debug!(monitor = %monitor.id, "Monitor already has a dock");
            return Ok(false);
        }

        let rect = Dock::rect_for_monitor(&monitor, self.settings.dock_height());
        let surface = server
            .create_dock_surface(rect)
            .with_context(|| format!("Failed to create dock window for {}", monitor.id))?;
        let label = server
            .create_label_surface()
            .with_context(|| format!("Failed to create hover label for {}", monitor.id))?;

        tracing::info!(
            monitor = %monitor.id,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            primary = monitor.is_primary,
            "Dock created"
        );
        self.docks.push(Dock::new(
            monitor,
            &self.settings,
            &self.shortcuts,
            surface,
            label,
            Arc::clone(&self.painter),
        ));
        Ok(true)
    }

    /// Drop every dock on `monitor`. Returns how many were dropped.
    pub fn remove_monitor(&mut self, monitor: &MonitorInfo) -> usize {
        let before = self.docks.len();
        self.docks.retain(|d| !d.monitor().same_descriptor(monitor));
        let removed = before - self.docks.len();

        if removed == 0 {
            tracing::debug!(monitor = %monitor.id, "No dock for removed monitor");
        } else {
            tracing::info!(monitor = %monitor.id, removed, "Dock removed");
        }
        removed
    }

    /// One poll: show or hide every dock for the pointer position.
    /// Docks whose monitor isn't in `live` are left alone until the pending
    /// removal catches up.
    pub fn tick(&mut self, cursor: Option<Point>, live: &[MonitorInfo]) {
        let Some(pointer) = cursor else {
            return;
        };
        let fraction = self.settings.activation_percentage;

        for dock in &mut self.docks {
            if !live.iter().any(|m| m.same_descriptor(dock.monitor())) {
                tracing::debug!(monitor = %dock.monitor().id, "Skipping dock on stale monitor");
                continue;
            }

            match activation::decide(&dock.monitor().rect, &dock.rect(), fraction, pointer) {
                VisibilityDecision::Show => {
                    dock.show();
                }
                VisibilityDecision::Hide => {
                    dock.hide();
                }
                VisibilityDecision::Keep => {}
            }
        }
    }

    pub fn handle_event(&mut self, event: PlatformEvent, server: &dyn DisplayServer) {
        match event {
            PlatformEvent::Tick => {
                self.apply_pending(server);
                let live = match server.monitors() {
                    Ok(live) => live,
                    Err(e) => {
                        tracing::warn!(error = %e, "Monitor enumeration failed, skipping tick");
                        return;
                    }
                };
                self.tick(server.cursor_position(), &live);
            }
            PlatformEvent::DisplaysChanged => {
                if let Err(e) = self.sync_monitors(server) {
                    tracing::warn!(error = %e, "Ignoring display change");
                }
            }
            PlatformEvent::PointerMoved { surface, position } => {
                if let Some(dock) = self.dock_for_surface_mut(surface) {
                    dock.pointer_moved(position);
                }
            }
            PlatformEvent::PointerLeft { surface } => {
                if let Some(dock) = self.dock_for_surface_mut(surface) {
                    dock.pointer_left();
                }
            }
            PlatformEvent::PointerPressed { surface, position } => {
                let target = self
                    .docks
                    .iter()
                    .find(|d| d.surface_id() == surface)
                    .and_then(|d| d.pointer_pressed(position))
                    .map(Path::to_path_buf);
                if let Some(target) = target {
                    self.launch(&target);
                }
            }
        }
    }

    /// Tear down every dock window
    pub fn shutdown(&mut self) {
        self.pending.clear();
        let count = self.docks.len();
        self.docks.clear();
        tracing::info!(docks = count, "Dock manager shut down");
    }

    fn launch(&self, target: &Path) {
        if let Err(e) = self.launcher.launch(target) {
            tracing::error!(target = ?target, error = %e, "Launch failed");
        }
    }

    fn dock_for_surface_mut(&mut self, surface: SurfaceId) -> Option<&mut Dock> {
        self.docks.iter_mut().find(|d| d.surface_id() == surface)
    }
}
