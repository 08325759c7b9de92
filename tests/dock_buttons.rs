mod common;

use std::path::Path;
use std::sync::Arc;

use common::{launcher, monitor, settings, Call, CallLog, FakeServer, SolidIcons};
use edgedock_core::config;
use edgedock_core::dock::{resolve_shortcuts, Dock};
use edgedock_core::geometry::{Point, Rect};
use edgedock_core::monitors::MonitorInfo;
use edgedock_core::render::DockPainter;
use edgedock_core::settings::{DockSettings, Shortcut};
use edgedock_core::traits::{CursorShape, DisplayServer, DockSurface};

fn build(server: &FakeServer, on: MonitorInfo, shortcuts: Vec<Shortcut>) -> (Dock, CallLog) {
    build_with(server, on, shortcuts, common::painter)
}

fn build_with(
    server: &FakeServer,
    on: MonitorInfo,
    shortcuts: Vec<Shortcut>,
    painter: fn(&Arc<DockSettings>) -> Arc<DockPainter>,
) -> (Dock, CallLog) {
    let settings = Arc::new(settings(shortcuts));
    let resolved = resolve_shortcuts(&settings, &SolidIcons(48));
    let rect = Dock::rect_for_monitor(&on, settings.dock_height());

    let surface = server.create_dock_surface(rect).unwrap();
    let label = server.create_label_surface().unwrap();
    let log = server.log_for(surface.id());

    let dock = Dock::new(on, &settings, &resolved, surface, label, painter(&settings));
    (dock, log)
}

fn full_hd() -> MonitorInfo {
    monitor("DISPLAY1", 0, 0, 1920, 1080)
}

fn with_spacer() -> Vec<Shortcut> {
    vec![
        launcher("Notepad", "C:\\Windows\\notepad.exe"),
        Shortcut::Spacer,
        launcher("Paint", "C:\\Windows\\mspaint.exe"),
    ]
}

#[test]
fn spacer_keeps_its_slot_but_has_no_button() {
    let server = FakeServer::default();
    let (dock, _) = build(&server, full_hd(), with_spacer());

    let buttons = dock.buttons();
    assert_eq!(buttons.len(), 2);
    assert_eq!(buttons[0].name, "Notepad");
    assert_eq!(buttons[0].rect, Rect::new(864, 0, 64, 64));
    assert_eq!(buttons[1].name, "Paint");
    assert_eq!(buttons[1].rect, Rect::new(992, 0, 64, 64));

    assert_eq!(dock.button_at(Point::new(930, 30)), None);
}

#[test]
fn first_and_last_rows_hit_the_button() {
    let server = FakeServer::default();
    let (dock, _) = build(&server, full_hd(), with_spacer());

    assert_eq!(dock.button_at(Point::new(864, 0)), Some(0));
    assert_eq!(dock.button_at(Point::new(927, 63)), Some(0));
    assert_eq!(dock.button_at(Point::new(1055, 0)), Some(1));
    assert_eq!(dock.button_at(Point::new(928, 63)), None);
    assert_eq!(dock.button_at(Point::new(900, 64)), None);
}

#[test]
fn too_many_shortcuts_start_at_the_left_edge() {
    let server = FakeServer::default();
    let shortcuts = (0..40)
        .map(|i| launcher(&format!("App {i}"), &format!("C:\\apps\\{i}.exe")))
        .collect();
    let (dock, _) = build(&server, full_hd(), shortcuts);

    assert_eq!(dock.buttons().len(), 40);
    assert_eq!(dock.buttons()[0].rect.x, 0);
    assert_eq!(dock.buttons()[39].rect.x, 39 * 64);
}

#[test]
fn dock_spans_monitor_top_edge() {
    let server = FakeServer::default();
    let (dock, _) = build(&server, monitor("LEFT", -1920, -100, 1920, 1200), vec![]);

    assert_eq!(dock.rect(), Rect::new(-1920, -100, 1920, 64));
    assert!(!dock.is_visible());
    assert!(dock.buttons().is_empty());
}

#[test]
fn show_presents_a_full_frame_before_mapping() {
    let server = FakeServer::default();
    let (mut dock, log) = build(&server, full_hd(), with_spacer());

    assert!(dock.show());
    assert_eq!(
        *log.borrow(),
        vec![
            Call::Present {
                width: 1920,
                height: 64
            },
            Call::Show,
        ]
    );
    assert!(!dock.show());
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn hidden_dock_ignores_pointer() {
    let server = FakeServer::default();
    let (mut dock, log) = build(&server, full_hd(), with_spacer());

    dock.pointer_moved(Point::new(870, 10));
    assert_eq!(dock.hovered(), None);
    assert_eq!(dock.pointer_pressed(Point::new(870, 10)), None);
    assert!(log.borrow().is_empty());
}

#[test]
fn press_returns_the_button_target() {
    let server = FakeServer::default();
    let (mut dock, _) = build(&server, full_hd(), with_spacer());
    dock.show();

    assert_eq!(
        dock.pointer_pressed(Point::new(1000, 40)),
        Some(Path::new("C:\\Windows\\mspaint.exe"))
    );
    assert_eq!(dock.pointer_pressed(Point::new(960, 40)), None);
}

#[test]
fn hover_changes_repaint_only_on_transitions() {
    let server = FakeServer::default();
    let (mut dock, log) = build(&server, full_hd(), with_spacer());
    dock.show();

    dock.pointer_moved(Point::new(870, 10));
    assert_eq!(dock.hovered(), Some(0));
    assert!(log.borrow().contains(&Call::Cursor(CursorShape::Hand)));
    let calls = log.borrow().len();

    // Same button, different pixel
    dock.pointer_moved(Point::new(900, 50));
    assert_eq!(log.borrow().len(), calls);

    // Onto the spacer
    dock.pointer_moved(Point::new(960, 50));
    assert_eq!(dock.hovered(), None);
    assert_eq!(log.borrow()[calls], Call::Cursor(CursorShape::Arrow));
}

#[test]
fn missing_font_hides_the_label_instead_of_showing_it() {
    let server = FakeServer::default();
    let (mut dock, log) = build(&server, full_hd(), with_spacer());
    dock.show();

    dock.pointer_moved(Point::new(1000, 10));
    assert_eq!(log.borrow().last(), Some(&Call::LabelHide));
    assert!(!log
        .borrow()
        .iter()
        .any(|c| matches!(c, Call::LabelShow { .. })));
}

/// Width of the label the font-backed painter draws for `text`
fn label_width(text: &str) -> u32 {
    let settings = Arc::new(settings(vec![]));
    common::painter_with_font(&settings)
        .render_label(text)
        .unwrap()
        .width()
}

#[test]
fn hover_label_shows_name_centered_below_the_strip() {
    let server = FakeServer::default();
    let (mut dock, log) = build_with(&server, full_hd(), with_spacer(), common::painter_with_font);
    dock.show();

    // Paint spans 992..1056, centered on 1024
    dock.pointer_moved(Point::new(1000, 10));
    let width = label_width("Paint");
    assert!(width > 2 * config::label::PADDING_X);
    assert_eq!(
        log.borrow().last(),
        Some(&Call::LabelShow {
            x: 1024 - width as i32 / 2,
            y: 64 + config::label::GAP_BELOW_DOCK,
            width,
        })
    );

    dock.pointer_moved(Point::new(960, 10));
    assert_eq!(log.borrow().last(), Some(&Call::LabelHide));
}

#[test]
fn hover_label_is_clamped_to_the_monitor() {
    let server = FakeServer::default();
    let name = "A Rather Long Application Name";
    let shortcuts = (0..40)
        .map(|i| launcher(&format!("{name} {i}"), &format!("C:\\apps\\{i}.exe")))
        .collect();
    let (mut dock, log) = build_with(
        &server,
        monitor("LEFT", -1920, 0, 1920, 1080),
        shortcuts,
        common::painter_with_font,
    );
    dock.show();

    // First button touches the monitor's left edge; its label would overhang
    dock.pointer_moved(Point::new(20, 10));
    let width = label_width(&format!("{name} 0"));
    assert!(width > 64);
    assert_eq!(
        log.borrow().last(),
        Some(&Call::LabelShow {
            x: -1920,
            y: 64 + config::label::GAP_BELOW_DOCK,
            width,
        })
    );
}

#[test]
fn hide_clears_hover_and_restores_arrow() {
    let server = FakeServer::default();
    let (mut dock, log) = build(&server, full_hd(), with_spacer());
    dock.show();
    dock.pointer_moved(Point::new(870, 10));

    assert!(dock.hide());
    assert_eq!(dock.hovered(), None);

    let calls = log.borrow();
    let tail = &calls[calls.len() - 3..];
    assert_eq!(
        tail,
        &[Call::LabelHide, Call::Cursor(CursorShape::Arrow), Call::Hide]
    );
}

#[test]
fn pointer_left_without_hover_does_nothing() {
    let server = FakeServer::default();
    let (mut dock, log) = build(&server, full_hd(), with_spacer());
    dock.show();
    let calls = log.borrow().len();

    dock.pointer_left();
    assert_eq!(log.borrow().len(), calls);
}

#[test]
fn dropping_the_dock_releases_its_surface() {
    let server = FakeServer::default();
    let (dock, log) = build(&server, full_hd(), with_spacer());

    drop(dock);
    assert_eq!(log.borrow().last(), Some(&Call::Dropped));
}
