//! Platform-agnostic pixel helpers
//!
//! tiny-skia keeps pixels as premultiplied RGBA; GDI DIB sections and
//! `UpdateLayeredWindow` use premultiplied BGRA. These helpers convert between
//! the two and live here so they can be tested on every platform.

use tiny_skia::{IntSize, Pixmap};

/// Convert premultiplied RGBA bytes (tiny-skia) to premultiplied BGRA (GDI)
///
/// # Arguments
/// * `rgba` - Pixel data, 4 bytes per pixel
///
/// # Returns
/// A new buffer of the same length with red and blue swapped
pub fn rgba_to_bgra(rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len());
    for px in rgba.chunks_exact(4) {
        out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
    }
    out
}

/// Build a pixmap from a 32-bit BGRA DIB.
///
/// Icons without an alpha channel come back from GDI with every alpha byte
/// zero; those are treated as opaque wherever a color was drawn. Color
/// channels are clamped to alpha so the result is valid premultiplied data.
///
/// # Returns
/// `None` when the dimensions don't match the buffer length or are zero
pub fn pixmap_from_bgra(width: u32, height: u32, bgra: &[u8]) -> Option<Pixmap> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || bgra.len() != expected {
        return None;
    }

    let has_alpha = bgra.chunks_exact(4).any(|px| px[3] != 0);

    let mut rgba = Vec::with_capacity(expected);
    for px in bgra.chunks_exact(4) {
        let (b, g, r) = (px[0], px[1], px[2]);
        let a = if has_alpha {
            px[3]
        } else if r | g | b != 0 {
            255
        } else {
            0
        };
        rgba.extend_from_slice(&[r.min(a), g.min(a), b.min(a), a]);
    }

    Pixmap::from_vec(rgba, IntSize::from_wh(width, height)?)
}

/// True when no pixel has any coverage, e.g. a DIB the icon never drew into
pub fn is_blank(pixmap: &Pixmap) -> bool {
    pixmap.pixels().iter().all(|px| px.alpha() == 0)
}
