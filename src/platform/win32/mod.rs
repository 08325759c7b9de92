//! Win32 backend
//!
//! All windows live on the thread that calls [`run`]. Window procedures only
//! record what happened in [`EVENTS`]; the message loop drains that queue into
//! the manager after every dispatched message, so manager state is never
//! touched from inside a window procedure.

mod event_loop;
mod icons;
mod surfaces;

pub use event_loop::run;
pub use icons::ShellIconSource;
pub use surfaces::Win32DisplayServer;

use lazy_static::lazy_static;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use windows::Win32::Foundation::{HWND, LPARAM};

use crate::geometry::Point;
use crate::manager::PlatformEvent;
use crate::traits::SurfaceId;

lazy_static! {
    /// Events recorded by window procedures, drained by the message loop
    static ref EVENTS: Mutex<VecDeque<PlatformEvent>> = Mutex::new(VecDeque::new());
    /// Dock windows that currently want the hand cursor
    static ref HAND_CURSOR_SURFACES: Mutex<HashSet<SurfaceId>> = Mutex::new(HashSet::new());
}

pub fn platform_name() -> &'static str {
    "windows"
}

fn push_event(event: PlatformEvent) {
    if let Ok(mut queue) = EVENTS.lock() {
        queue.push_back(event);
    }
}

fn pop_event() -> Option<PlatformEvent> {
    EVENTS.lock().ok().and_then(|mut queue| queue.pop_front())
}

fn wants_hand_cursor(surface: SurfaceId) -> bool {
    HAND_CURSOR_SURFACES
        .lock()
        .map(|set| set.contains(&surface))
        .unwrap_or(false)
}

fn set_hand_cursor(surface: SurfaceId, hand: bool) {
    if let Ok(mut set) = HAND_CURSOR_SURFACES.lock() {
        if hand {
            set.insert(surface);
        } else {
            set.remove(&surface);
        }
    }
}

fn surface_id(hwnd: HWND) -> SurfaceId {
    hwnd.0 as isize
}

fn hwnd_from(surface: SurfaceId) -> HWND {
    HWND(surface as *mut std::ffi::c_void)
}

/// Client coordinates packed into a mouse message's lparam (signed 16-bit each)
fn lparam_point(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    Point::new(x, y)
}

fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lparam_point_keeps_sign() {
        // (-5, 10) packed as two 16-bit halves
        let packed = ((10i32 as u16 as isize) << 16) | (-5i16 as u16 as isize);
        assert_eq!(lparam_point(LPARAM(packed)), Point::new(-5, 10));
    }

    #[test]
    fn wide_string_is_nul_terminated() {
        assert_eq!(wide_string("ab"), vec![97, 98, 0]);
    }

    #[test]
    fn hand_cursor_set_tracks_surfaces() {
        set_hand_cursor(42, true);
        assert!(wants_hand_cursor(42));
        set_hand_cursor(42, false);
        assert!(!wants_hand_cursor(42));
    }
}
