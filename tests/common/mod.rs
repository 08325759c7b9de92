//! In-memory platform for driving docks and the manager in tests
#![allow(dead_code)]

use anyhow::{bail, Result};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tiny_skia::{Color, Pixmap};

use edgedock_core::geometry::{Point, Rect};
use edgedock_core::icon::IconResolver;
use edgedock_core::monitors::MonitorInfo;
use edgedock_core::render::DockPainter;
use edgedock_core::settings::{DockSettings, Launcher, Shortcut};
use edgedock_core::text::TextRasterizer;
use edgedock_core::traits::{
    AppLauncher, CursorShape, DisplayServer, DockSurface, HoverLabelSurface, SurfaceId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Present { width: u32, height: u32 },
    Show,
    Hide,
    Cursor(CursorShape),
    LabelShow { x: i32, y: i32, width: u32 },
    LabelHide,
    Dropped,
}

/// Calls made to one surface, newest last
pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct FakeSurface {
    id: SurfaceId,
    log: CallLog,
}

impl DockSurface for FakeSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn present(&self, frame: &Pixmap) {
        self.log.borrow_mut().push(Call::Present {
            width: frame.width(),
            height: frame.height(),
        });
    }

    fn show(&self) {
        self.log.borrow_mut().push(Call::Show);
    }

    fn hide(&self) {
        self.log.borrow_mut().push(Call::Hide);
    }

    fn set_cursor(&self, cursor: CursorShape) {
        self.log.borrow_mut().push(Call::Cursor(cursor));
    }
}

impl Drop for FakeSurface {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Call::Dropped);
    }
}

pub struct FakeLabel {
    log: CallLog,
}

impl HoverLabelSurface for FakeLabel {
    fn show_at(&self, x: i32, y: i32, frame: &Pixmap) {
        self.log.borrow_mut().push(Call::LabelShow {
            x,
            y,
            width: frame.width(),
        });
    }

    fn hide(&self) {
        self.log.borrow_mut().push(Call::LabelHide);
    }
}

/// Display server with a mutable monitor list. Dock surface ids start at 1
/// and increase with every created surface.
#[derive(Default)]
pub struct FakeServer {
    pub monitors: RefCell<Vec<MonitorInfo>>,
    pub cursor: Cell<Option<Point>>,
    pub fail_enumeration: Cell<bool>,
    pub fail_surfaces: Cell<bool>,
    next_id: Cell<SurfaceId>,
    /// Log per created dock surface, in creation order (label calls included)
    pub logs: RefCell<Vec<(SurfaceId, CallLog)>>,
    pending_label_log: RefCell<Option<CallLog>>,
}

impl FakeServer {
    pub fn with_monitors(monitors: Vec<MonitorInfo>) -> Self {
        let server = Self::default();
        *server.monitors.borrow_mut() = monitors;
        server
    }

    pub fn set_cursor(&self, x: i32, y: i32) {
        self.cursor.set(Some(Point::new(x, y)));
    }

    pub fn log_for(&self, id: SurfaceId) -> CallLog {
        self.logs
            .borrow()
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, log)| Rc::clone(log))
            .expect("no surface with that id")
    }
}

impl DisplayServer for FakeServer {
    fn monitors(&self) -> Result<Vec<MonitorInfo>> {
        if self.fail_enumeration.get() {
            bail!("enumeration failed");
        }
        Ok(self.monitors.borrow().clone())
    }

    fn cursor_position(&self) -> Option<Point> {
        self.cursor.get()
    }

    fn create_dock_surface(&self, _rect: Rect) -> Result<Box<dyn DockSurface>> {
        if self.fail_surfaces.get() {
            bail!("no more windows");
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        self.logs.borrow_mut().push((id, Rc::clone(&log)));
        // The manager creates the label right after the dock; share the log
        *self.pending_label_log.borrow_mut() = Some(Rc::clone(&log));
        Ok(Box::new(FakeSurface { id, log }))
    }

    fn create_label_surface(&self) -> Result<Box<dyn HoverLabelSurface>> {
        let log = self
            .pending_label_log
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Rc::new(RefCell::new(Vec::new())));
        Ok(Box::new(FakeLabel { log }))
    }
}

/// Records every launch; paths listed in `failing` return an error
#[derive(Default, Clone)]
pub struct RecordingLauncher {
    pub launched: Rc<RefCell<Vec<PathBuf>>>,
    pub failing: Vec<PathBuf>,
}

impl AppLauncher for RecordingLauncher {
    fn launch(&self, path: &Path) -> Result<()> {
        self.launched.borrow_mut().push(path.to_path_buf());
        if self.failing.iter().any(|p| p == path) {
            bail!("Path does not exist: {}", path.display());
        }
        Ok(())
    }
}

/// Solid squares instead of real icon lookup
pub struct SolidIcons(pub u32);

impl IconResolver for SolidIcons {
    fn resolve_icon(&self, _name: &str, _image: Option<&Path>, _exe: Option<&Path>) -> Pixmap {
        let mut pixmap = Pixmap::new(self.0, self.0).unwrap();
        pixmap.fill(Color::from_rgba8(0, 0, 255, 255));
        pixmap
    }
}

pub fn launcher(name: &str, path: &str) -> Shortcut {
    Shortcut::Launcher(Launcher {
        name: name.to_string(),
        path: PathBuf::from(path),
        icon_path: None,
    })
}

/// 48 px icons with 8 px padding: 64 px footprint and dock height
pub fn settings(shortcuts: Vec<Shortcut>) -> DockSettings {
    DockSettings {
        icon_size: 48,
        icon_padding: 8,
        dock_background_color: [30, 30, 30, 200],
        hover_background_color: [255, 255, 255, 60],
        hover_text_color: [255, 255, 255, 255],
        hover_text_font: "Segoe UI".to_string(),
        hover_text_size: 14.0,
        activation_percentage: 0.25,
        shortcuts,
        log_level: "Info".to_string(),
        log_to_file: false,
        log_retention_days: 7,
    }
}

/// Painter without a font: docks render, labels don't
pub fn painter(settings: &Arc<DockSettings>) -> Arc<DockPainter> {
    Arc::new(DockPainter::new(Arc::clone(settings), None))
}

/// DejaVu Sans Mono, shipped with the tests so text renders on any machine
pub const TEST_FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/DejaVuSansMono.ttf");

pub fn test_font() -> Arc<TextRasterizer> {
    Arc::new(TextRasterizer::from_file(Path::new(TEST_FONT)).unwrap())
}

/// Painter with the bundled font: labels render too
pub fn painter_with_font(settings: &Arc<DockSettings>) -> Arc<DockPainter> {
    Arc::new(DockPainter::new(Arc::clone(settings), Some(test_font())))
}

pub fn monitor(id: &str, x: i32, y: i32, width: u32, height: u32) -> MonitorInfo {
    MonitorInfo::new(id, Rect::new(x, y, width, height))
}
