//! Executable icon extraction through the shell

use anyhow::{bail, Context, Result};
use std::mem;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use tiny_skia::Pixmap;

use windows::core::PCWSTR;
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, ReleaseDC, SelectObject,
    BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP,
};
use windows::Win32::UI::Shell::ExtractIconExW;
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyIcon, DrawIconEx, GetSystemMetrics, DI_NORMAL, HICON, SM_CXICON,
};

use crate::icon::ExecutableIconSource;
use crate::platform_utils::{is_blank, pixmap_from_bgra};

/// Reads the first large icon resource of an executable at system icon size
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellIconSource;

impl ExecutableIconSource for ShellIconSource {
    fn extract_icon(&self, executable: &Path) -> Result<Pixmap> {
        let wide: Vec<u16> = executable
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        unsafe {
            let mut large = HICON::default();
            let count = ExtractIconExW(
                PCWSTR(wide.as_ptr()),
                0,
                Some(&mut large as *mut HICON),
                None,
                1,
            );
            if count == 0 || large.is_invalid() {
                bail!("No icon resource in {}", executable.display());
            }

            let size = GetSystemMetrics(SM_CXICON).max(1) as u32;
            let result = rasterize_icon(large, size);
            let _ = DestroyIcon(large);
            result
        }
    }
}

/// Draw `icon` into a transparent 32-bit DIB and read it back
unsafe fn rasterize_icon(icon: HICON, size: u32) -> Result<Pixmap> {
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
            biWidth: size as i32,
            biHeight: -(size as i32),
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
        Ok(b) => b,
        Err(e) => {
            let _ = DeleteDC(mem_dc);
            let _ = ReleaseDC(None, screen_dc);
            return Err(e).context("CreateDIBSection failed");
        }
    };

    let old = SelectObject(mem_dc, bitmap.into());
    let drawn = DrawIconEx(
        mem_dc,
        0,
        0,
        icon,
        size as i32,
        size as i32,
        0,
        None,
        DI_NORMAL,
    );

    // DIB sections start zeroed, so untouched pixels read back transparent
    let mut bgra = vec![0u8; (size * size * 4) as usize];
    if drawn.is_ok() && !bits.is_null() {
        std::ptr::copy_nonoverlapping(bits as *const u8, bgra.as_mut_ptr(), bgra.len());
    }

    SelectObject(mem_dc, old);
    let _ = DeleteObject(bitmap.into());
    let _ = DeleteDC(mem_dc);
    let _ = ReleaseDC(None, screen_dc);

    drawn.context("DrawIconEx failed")?;
    let pixmap = pixmap_from_bgra(size, size, &bgra).context("Icon bitmap has no usable pixels")?;
    if is_blank(&pixmap) {
        bail!("Icon drew no visible pixels");
    }
    Ok(pixmap)
}
