//! UI thread message loop, poll timer, console interrupt and session end handling

use anyhow::{bail, Context, Result};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use windows::core::BOOL;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Console::{
    SetConsoleCtrlHandler, CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT, CTRL_C_EVENT,
};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, KillTimer, PostQuitMessage,
    PostThreadMessageW, SetTimer, TranslateMessage, MSG, WM_CLOSE, WM_DESTROY, WM_DISPLAYCHANGE,
    WM_ENDSESSION, WM_QUERYENDSESSION, WM_QUIT, WM_TIMER, WS_EX_TOOLWINDOW,
};

use super::surfaces::{register_class, Win32DisplayServer};
use super::{pop_event, push_event};
use crate::config;
use crate::geometry::Rect;
use crate::manager::{DockManager, PlatformEvent};
use crate::traits::DisplayServer;

static LISTENER_CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);
static UI_THREAD_ID: AtomicU32 = AtomicU32::new(0);

/// Ask the UI thread to leave its message loop. Safe from any thread.
fn request_quit() {
    let thread_id = UI_THREAD_ID.load(Ordering::SeqCst);
    if thread_id == 0 {
        return;
    }

    unsafe {
        if PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)).is_err() {
            tracing::warn!(thread_id, "Failed to post quit to the UI thread");
        }
    }
}

/// Create the docks and pump messages until a quit is requested.
/// Every dock window is destroyed before this returns.
pub fn run(manager: &mut DockManager) -> Result<()> {
    let server = Win32DisplayServer;

    unsafe {
        // Monitor and pointer coordinates in physical pixels
        if let Err(e) = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) {
            tracing::debug!(error = %e, "DPI awareness already set");
        }

        UI_THREAD_ID.store(GetCurrentThreadId(), Ordering::SeqCst);
        if let Err(e) = SetConsoleCtrlHandler(Some(console_ctrl_handler), true) {
            tracing::warn!(error = %e, "Failed to install console control handler");
        }
    }

    let listener = ListenerWindow::create()?;
    let result = pump(manager, &server, &listener);

    manager.shutdown();
    UI_THREAD_ID.store(0, Ordering::SeqCst);
    drop(listener);
    tracing::info!("Message loop finished");
    result
}

fn pump(manager: &mut DockManager, server: &dyn DisplayServer, listener: &ListenerWindow) -> Result<()> {
    manager.start(server)?;
    listener.start_timer()?;
    tracing::info!(
        docks = manager.docks().len(),
        interval_ms = config::timing::POLL_INTERVAL_MS,
        "Dock manager running"
    );

    let mut msg = MSG::default();
    loop {
        let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if result.0 <= 0 {
            break; // WM_QUIT or error
        }

        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        drain_events(manager, server);
    }

    listener.stop_timer();
    Ok(())
}

fn drain_events(manager: &mut DockManager, server: &dyn DisplayServer) {
    while let Some(event) = pop_event() {
        manager.handle_event(event, server);
    }
}

unsafe extern "system" fn console_ctrl_handler(ctrl_type: u32) -> BOOL {
    match ctrl_type {
        CTRL_C_EVENT | CTRL_BREAK_EVENT | CTRL_CLOSE_EVENT => {
            tracing::info!(ctrl_type, "Console interrupt received, shutting down");
            request_quit();
            BOOL::from(true)
        }
        _ => BOOL::from(false),
    }
}

/// Hidden top-level window: owns the poll timer and receives display change
/// broadcasts (message-only windows don't get broadcasts)
struct ListenerWindow {
    hwnd: HWND,
}

impl ListenerWindow {
    fn create() -> Result<Self> {
        let hwnd = unsafe {
            let class_name = register_class(
                config::window::LISTENER_CLASS_NAME,
                Some(listener_window_proc),
                &LISTENER_CLASS_REGISTERED,
            )?;
            super::surfaces::create_hidden_popup(
                &class_name,
                config::window::DOCK_WINDOW_TITLE,
                WS_EX_TOOLWINDOW,
                Rect::new(0, 0, 1, 1),
            )
            .context("Failed to create display listener window")?
        };
        Ok(Self { hwnd })
    }

    fn start_timer(&self) -> Result<()> {
        let id = unsafe {
            SetTimer(
                Some(self.hwnd),
                config::timing::POLL_TIMER_ID,
                config::timing::POLL_INTERVAL_MS,
                None,
            )
        };
        if id == 0 {
            bail!("SetTimer failed");
        }
        Ok(())
    }

    fn stop_timer(&self) {
        unsafe {
            let _ = KillTimer(Some(self.hwnd), config::timing::POLL_TIMER_ID);
        }
    }
}

impl Drop for ListenerWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

unsafe extern "system" fn listener_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TIMER if wparam.0 == config::timing::POLL_TIMER_ID => {
            push_event(PlatformEvent::Tick);
            LRESULT(0)
        }
        WM_DISPLAYCHANGE => {
            tracing::debug!("WM_DISPLAYCHANGE");
            push_event(PlatformEvent::DisplaysChanged);
            LRESULT(0)
        }
        // Logoff or shutdown: never veto, leave the loop once it's certain
        WM_QUERYENDSESSION => LRESULT(1),
        WM_ENDSESSION => {
            if wparam.0 != 0 {
                tracing::info!("Session ending, shutting down");
                request_quit();
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        WM_DESTROY => {
            // Only an unexpected destroy ends the loop; normal teardown happens after it
            if UI_THREAD_ID.load(Ordering::SeqCst) != 0 {
                PostQuitMessage(0);
            }
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
