//! Layered dock and label windows, monitor enumeration and pointer polling

use anyhow::{bail, Context, Result};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use tiny_skia::Pixmap;

use windows::core::{BOOL, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, RECT, SIZE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, EnumDisplayMonitors, GetDC,
    GetMonitorInfoW, ReleaseDC, SelectObject, AC_SRC_ALPHA, AC_SRC_OVER, BITMAPINFO,
    BITMAPINFOHEADER, BI_RGB, BLENDFUNCTION, DIB_RGB_COLORS, HBITMAP, HDC, HMONITOR,
    MONITORINFOEXW,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};
use windows::Win32::UI::Input::KeyboardAndMouse::{TrackMouseEvent, TME_LEAVE, TRACKMOUSEEVENT};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetCursorPos, LoadCursorW, RegisterClassExW,
    SetCursor, SetWindowPos, ShowWindow, UpdateLayeredWindow, HWND_TOPMOST, IDC_ARROW, IDC_HAND,
    MA_NOACTIVATE, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SW_HIDE, SW_SHOWNOACTIVATE, ULW_ALPHA,
    WINDOW_EX_STYLE, WM_CLOSE, WM_LBUTTONDOWN, WM_MOUSEACTIVATE, WM_MOUSELEAVE, WM_MOUSEMOVE,
    WM_SETCURSOR, WNDCLASSEXW, WNDPROC, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
    WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

use super::{
    hwnd_from, lparam_point, push_event, set_hand_cursor, surface_id, wants_hand_cursor,
    wide_string,
};
use crate::config;
use crate::geometry::{Point, Rect};
use crate::manager::PlatformEvent;
use crate::monitors::MonitorInfo;
use crate::platform_utils::rgba_to_bgra;
use crate::traits::{
    CursorShape, DisplayServer, DockSurface, HoverLabelSurface, SurfaceId,
};

static DOCK_CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);
static LABEL_CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// `DisplayServer` backed by the Win32 desktop of the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32DisplayServer;

impl DisplayServer for Win32DisplayServer {
    fn monitors(&self) -> Result<Vec<MonitorInfo>> {
        enumerate_monitors()
    }

    fn cursor_position(&self) -> Option<Point> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.ok()?;
        Some(Point::new(point.x, point.y))
    }

    fn create_dock_surface(&self, rect: Rect) -> Result<Box<dyn DockSurface>> {
        Ok(Box::new(DockWindow::create(rect)?))
    }

    fn create_label_surface(&self) -> Result<Box<dyn HoverLabelSurface>> {
        Ok(Box::new(LabelWindow::create()?))
    }
}

/// Every monitor attached to the desktop, in enumeration order.
/// Monitors reporting an empty rectangle are skipped.
pub fn enumerate_monitors() -> Result<Vec<MonitorInfo>> {
    let mut monitors: Vec<MonitorInfo> = Vec::new();

    unsafe extern "system" fn enum_proc(
        hmonitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        lparam: LPARAM,
    ) -> BOOL {
        let monitors = &mut *(lparam.0 as *mut Vec<MonitorInfo>);

        let mut info: MONITORINFOEXW = mem::zeroed();
        info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;

        if GetMonitorInfoW(hmonitor, &mut info.monitorInfo as *mut _ as *mut _).as_bool() {
            let rect = info.monitorInfo.rcMonitor;
            let name = String::from_utf16_lossy(&info.szDevice)
                .trim_end_matches('\0')
                .to_string();
            let width = rect.right - rect.left;
            let height = rect.bottom - rect.top;

            if width <= 0 || height <= 0 {
                tracing::warn!(monitor = %name, width, height, "Skipping monitor with empty geometry");
                return BOOL::from(true);
            }

            let mut dpi_x = 96;
            let mut dpi_y = 96;
            let _ = GetDpiForMonitor(hmonitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y);

            let mut monitor = MonitorInfo::new(
                name,
                Rect::new(rect.left, rect.top, width as u32, height as u32),
            );
            monitor.scale_factor = dpi_x as f64 / 96.0;
            monitor.is_primary = info.monitorInfo.dwFlags == 1;
            monitors.push(monitor);
        }

        BOOL::from(true)
    }

    let ok = unsafe {
        let monitors_ptr = &mut monitors as *mut Vec<MonitorInfo> as isize;
        EnumDisplayMonitors(
            Some(HDC::default()),
            None,
            Some(enum_proc),
            LPARAM(monitors_ptr),
        )
    };
    if !ok.as_bool() {
        bail!("EnumDisplayMonitors failed");
    }

    Ok(monitors)
}

/// Register a window class once per process
pub(super) unsafe fn register_class(
    name: &str,
    proc: WNDPROC,
    registered: &AtomicBool,
) -> Result<Vec<u16>> {
    let class_name = wide_string(name);

    if !registered.swap(true, Ordering::SeqCst) {
        let hinstance = GetModuleHandleW(None).context("GetModuleHandleW failed")?;
        let wc = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: proc,
            hInstance: hinstance.into(),
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };

        if RegisterClassExW(&wc) == 0 {
            registered.store(false, Ordering::SeqCst);
            bail!("Failed to register window class {}", name);
        }
        tracing::debug!(class = name, "Window class registered");
    }

    Ok(class_name)
}

/// Hidden borderless popup with the given extended style
pub(super) unsafe fn create_hidden_popup(
    class_name: &[u16],
    title: &str,
    ex_style: WINDOW_EX_STYLE,
    rect: Rect,
) -> Result<HWND> {
    let hinstance = GetModuleHandleW(None).context("GetModuleHandleW failed")?;
    let title = wide_string(title);

    CreateWindowExW(
        ex_style,
        PCWSTR(class_name.as_ptr()),
        PCWSTR(title.as_ptr()),
        WS_POPUP,
        rect.x,
        rect.y,
        rect.width.max(1) as i32,
        rect.height.max(1) as i32,
        None,
        None,
        Some(hinstance.into()),
        None,
    )
    .context("CreateWindowExW failed")
}

/// Upload a premultiplied frame into a layered window at screen position `at`
unsafe fn update_layered(hwnd: HWND, at: Point, frame: &Pixmap) -> Result<()> {
    let width = frame.width() as i32;
    let height = frame.height() as i32;

    let screen_dc = GetDC(None);
    if screen_dc.is_invalid() {
        bail!("GetDC failed");
    }

    let mem_dc = CreateCompatibleDC(Some(screen_dc));
    if mem_dc.is_invalid() {
        let _ = ReleaseDC(None, screen_dc);
        bail!("CreateCompatibleDC failed");
    }

    let bmi = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            biHeight: -height,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut bits: *mut std::ffi::c_void = std::ptr::null_mut();
    let dib: windows::core::Result<HBITMAP> =
        CreateDIBSection(Some(mem_dc), &bmi, DIB_RGB_COLORS, &mut bits, None, 0);
    let bitmap = match dib {
        Ok(b) if !bits.is_null() => b,
        Ok(b) => {
            let _ = DeleteObject(b.into());
            let _ = DeleteDC(mem_dc);
            let _ = ReleaseDC(None, screen_dc);
            bail!("CreateDIBSection returned no pixel buffer");
        }
        Err(e) => {
            let _ = DeleteDC(mem_dc);
            let _ = ReleaseDC(None, screen_dc);
            return Err(e).context("CreateDIBSection failed");
        }
    };

    let bgra = rgba_to_bgra(frame.data());
    std::ptr::copy_nonoverlapping(bgra.as_ptr(), bits as *mut u8, bgra.len());

    let old = SelectObject(mem_dc, bitmap.into());

    let position = POINT { x: at.x, y: at.y };
    let size = SIZE {
        cx: width,
        cy: height,
    };
    let source = POINT { x: 0, y: 0 };
    let blend = BLENDFUNCTION {
        BlendOp: AC_SRC_OVER as u8,
        BlendFlags: 0,
        SourceConstantAlpha: 255,
        AlphaFormat: AC_SRC_ALPHA as u8,
    };

    let result = UpdateLayeredWindow(
        hwnd,
        Some(screen_dc),
        Some(&position as *const POINT),
        Some(&size as *const SIZE),
        Some(mem_dc),
        Some(&source as *const POINT),
        COLORREF(0),
        Some(&blend as *const BLENDFUNCTION),
        ULW_ALPHA,
    );

    SelectObject(mem_dc, old);
    let _ = DeleteObject(bitmap.into());
    let _ = DeleteDC(mem_dc);
    let _ = ReleaseDC(None, screen_dc);

    result.context("UpdateLayeredWindow failed")
}

unsafe fn raise_without_activation(hwnd: HWND) {
    let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
    let _ = SetWindowPos(
        hwnd,
        Some(HWND_TOPMOST),
        0,
        0,
        0,
        0,
        SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
    );
}

// ========== Dock strip ==========

/// Always-on-top, non-activating layered popup backing one dock
pub struct DockWindow {
    hwnd: SurfaceId,
    rect: Rect,
}

impl DockWindow {
    pub fn create(rect: Rect) -> Result<Self> {
        let hwnd = unsafe {
            let class_name = register_class(
                config::window::DOCK_CLASS_NAME,
                Some(dock_window_proc),
                &DOCK_CLASS_REGISTERED,
            )?;
            create_hidden_popup(
                &class_name,
                config::window::DOCK_WINDOW_TITLE,
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_LAYERED | WS_EX_NOACTIVATE,
                rect,
            )
            .context("Failed to create dock window")?
        };

        tracing::debug!(hwnd = ?hwnd, x = rect.x, y = rect.y, "Dock window created");
        Ok(Self {
            hwnd: surface_id(hwnd),
            rect,
        })
    }

    fn pointer_inside(&self) -> bool {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.is_ok() && self.rect.contains(Point::new(point.x, point.y))
    }
}

impl DockSurface for DockWindow {
    fn id(&self) -> SurfaceId {
        self.hwnd
    }

    fn present(&self, frame: &Pixmap) {
        let origin = Point::new(self.rect.x, self.rect.y);
        if let Err(e) = unsafe { update_layered(hwnd_from(self.hwnd), origin, frame) } {
            tracing::warn!(hwnd = self.hwnd, error = %e, "Failed to present dock frame");
        }
    }

    fn show(&self) {
        unsafe { raise_without_activation(hwnd_from(self.hwnd)) };
    }

    fn hide(&self) {
        unsafe {
            let _ = ShowWindow(hwnd_from(self.hwnd), SW_HIDE);
        }
    }

    fn set_cursor(&self, cursor: CursorShape) {
        set_hand_cursor(self.hwnd, cursor == CursorShape::Hand);

        // WM_SETCURSOR only arrives on the next move; apply right away
        if self.pointer_inside() {
            let id = match cursor {
                CursorShape::Hand => IDC_HAND,
                CursorShape::Arrow => IDC_ARROW,
            };
            unsafe {
                if let Ok(cur) = LoadCursorW(None, id) {
                    let _ = SetCursor(Some(cur));
                }
            }
        }
    }
}

impl Drop for DockWindow {
    fn drop(&mut self) {
        set_hand_cursor(self.hwnd, false);
        unsafe {
            let _ = DestroyWindow(hwnd_from(self.hwnd));
        }
    }
}

unsafe extern "system" fn dock_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let surface = surface_id(hwnd);

    match msg {
        WM_MOUSEMOVE => {
            // Ask for WM_MOUSELEAVE; re-arming on every move is harmless
            let mut tme = TRACKMOUSEEVENT {
                cbSize: mem::size_of::<TRACKMOUSEEVENT>() as u32,
                dwFlags: TME_LEAVE,
                hwndTrack: hwnd,
                dwHoverTime: 0,
            };
            let _ = TrackMouseEvent(&mut tme);

            push_event(PlatformEvent::PointerMoved {
                surface,
                position: lparam_point(lparam),
            });
            LRESULT(0)
        }
        WM_MOUSELEAVE => {
            push_event(PlatformEvent::PointerLeft { surface });
            LRESULT(0)
        }
        WM_LBUTTONDOWN => {
            push_event(PlatformEvent::PointerPressed {
                surface,
                position: lparam_point(lparam),
            });
            LRESULT(0)
        }
        WM_MOUSEACTIVATE => LRESULT(MA_NOACTIVATE as isize),
        WM_SETCURSOR => {
            let id = if wants_hand_cursor(surface) {
                IDC_HAND
            } else {
                IDC_ARROW
            };
            if let Ok(cur) = LoadCursorW(None, id) {
                let _ = SetCursor(Some(cur));
            }
            LRESULT(1)
        }
        // Docks are destroyed by their owner only
        WM_CLOSE => LRESULT(0),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ========== Hover label ==========

/// Click-through layered popup showing the hovered button's name
pub struct LabelWindow {
    hwnd: SurfaceId,
}

impl LabelWindow {
    pub fn create() -> Result<Self> {
        let hwnd = unsafe {
            let class_name = register_class(
                config::window::LABEL_CLASS_NAME,
                Some(label_window_proc),
                &LABEL_CLASS_REGISTERED,
            )?;
            create_hidden_popup(
                &class_name,
                config::window::DOCK_WINDOW_TITLE,
                WS_EX_TOPMOST
                    | WS_EX_TOOLWINDOW
                    | WS_EX_LAYERED
                    | WS_EX_NOACTIVATE
                    | WS_EX_TRANSPARENT,
                Rect::new(0, 0, 1, 1),
            )
            .context("Failed to create hover label window")?
        };

        Ok(Self {
            hwnd: surface_id(hwnd),
        })
    }
}

impl HoverLabelSurface for LabelWindow {
    fn show_at(&self, x: i32, y: i32, frame: &Pixmap) {
        let hwnd = hwnd_from(self.hwnd);
        unsafe {
            match update_layered(hwnd, Point::new(x, y), frame) {
                Ok(()) => raise_without_activation(hwnd),
                Err(e) => tracing::warn!(hwnd = self.hwnd, error = %e, "Failed to show hover label"),
            }
        }
    }

    fn hide(&self) {
        unsafe {
            let _ = ShowWindow(hwnd_from(self.hwnd), SW_HIDE);
        }
    }
}

impl Drop for LabelWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(hwnd_from(self.hwnd));
        }
    }
}

unsafe extern "system" fn label_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_MOUSEACTIVATE => LRESULT(MA_NOACTIVATE as isize),
        WM_CLOSE => LRESULT(0),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
