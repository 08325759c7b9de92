//! Glyph rasterizing for the hover label and placeholder letters.
//!
//! Fonts are looked up by family name in the system font database, which reads
//! the names from each font's own name table; a path to a font file is accepted
//! as well. No font found means no text, never an error for the caller.

use anyhow::{anyhow, Context, Result};
use fontdb::{Database, Family, Query};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use std::path::Path;
use tiny_skia::Pixmap;

/// Tried in order when the configured family isn't installed
const FALLBACK_FONTS: &[&str] = &["Segoe UI", "Arial", "DejaVu Sans", "Liberation Sans", "Helvetica"];

pub struct TextRasterizer {
    font: fontdue::Font,
}

/// Pixel extent of a laid-out string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

impl TextRasterizer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_collection(bytes, 0)
    }

    /// Face `index` of a font file that may be a collection (`.ttc`)
    pub fn from_collection(bytes: Vec<u8>, index: u32) -> Result<Self> {
        let settings = fontdue::FontSettings {
            collection_index: index,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(bytes, settings)
            .map_err(|e| anyhow!("Failed to parse font: {}", e))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font file {}", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// Load `family` (or the first installed fallback). `family` may also be a
    /// path to a font file. Returns `None` when no usable font exists on this
    /// machine.
    pub fn load(family: &str) -> Option<Self> {
        let direct = Path::new(family);
        if direct.is_file() {
            match Self::from_file(direct) {
                Ok(rasterizer) => {
                    tracing::debug!(font = ?direct, "Loaded font file");
                    return Some(rasterizer);
                }
                Err(e) => {
                    tracing::warn!(font = ?direct, error = %format!("{:#}", e), "Font file unusable");
                }
            }
        }

        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "System fonts indexed");
        Self::load_from(&db, family)
    }

    /// Same as [`TextRasterizer::load`] against an explicit font database
    pub fn load_from(db: &Database, family: &str) -> Option<Self> {
        let candidates = std::iter::once(family).chain(FALLBACK_FONTS.iter().copied());
        for name in candidates {
            match Self::from_database(db, name) {
                Some(Ok(rasterizer)) => {
                    if name != family {
                        tracing::warn!(requested = family, using = name, "Font not found, using fallback");
                    }
                    tracing::debug!(family = name, "Loaded font");
                    return Some(rasterizer);
                }
                Some(Err(e)) => {
                    tracing::warn!(family = name, error = %format!("{:#}", e), "Skipping unreadable font");
                }
                None => {}
            }
        }

        tracing::warn!(requested = family, "No usable font found, text will not be drawn");
        None
    }

    /// `None` when no face in `db` carries the family name
    fn from_database(db: &Database, family: &str) -> Option<Result<Self>> {
        let id = find_family(db, family)?;
        db.with_face_data(id, |data, index| Self::from_collection(data.to_vec(), index))
    }

    fn layout(&self, text: &str, px: f32) -> Layout {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.font], &TextStyle::new(text, px, 0));
        layout
    }

    pub fn measure(&self, text: &str, px: f32) -> TextExtent {
        if text.is_empty() {
            return TextExtent { width: 0, height: 0 };
        }

        let layout = self.layout(text, px);
        let width = layout
            .glyphs()
            .iter()
            .map(|g| g.x + g.width as f32)
            .fold(0.0f32, f32::max);

        TextExtent {
            width: width.ceil() as u32,
            height: layout.height().ceil() as u32,
        }
    }

    /// Draw `text` with its layout box's top-left corner at (x, y)
    pub fn draw(&self, pixmap: &mut Pixmap, text: &str, x: i32, y: i32, px: f32, color: [u8; 4]) {
        if text.is_empty() {
            return;
        }

        let layout = self.layout(text, px);
        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (metrics, coverage) = self.font.rasterize_config(glyph.key);
            let origin_x = x + glyph.x.round() as i32;
            let origin_y = y + glyph.y.round() as i32;

            for dy in 0..metrics.height {
                for dx in 0..metrics.width {
                    let alpha = coverage[dy * metrics.width + dx];
                    if alpha > 0 {
                        blend_pixel(pixmap, origin_x + dx as i32, origin_y + dy as i32, color, alpha);
                    }
                }
            }
        }
    }

    /// Draw `text` centered inside the (x, y, width, height) box
    pub fn draw_centered(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        area: (i32, i32, u32, u32),
        px: f32,
        color: [u8; 4],
    ) {
        let extent = self.measure(text, px);
        let (x, y, width, height) = area;
        let left = x + (width as i32 - extent.width as i32) / 2;
        let top = y + (height as i32 - extent.height as i32) / 2;
        self.draw(pixmap, text, left, top, px, color);
    }
}

/// Source-over blend of one straight-alpha color with glyph coverage onto a
/// premultiplied RGBA pixmap
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: [u8; 4], coverage: u8) {
    if x < 0 || y < 0 || x >= pixmap.width() as i32 || y >= pixmap.height() as i32 {
        return;
    }

    let offset = (y as usize * pixmap.width() as usize + x as usize) * 4;
    let data = pixmap.data_mut();

    let src_a = (color[3] as f32 / 255.0) * (coverage as f32 / 255.0);
    let inv = 1.0 - src_a;

    for channel in 0..3 {
        let src = color[channel] as f32 * src_a;
        let dst = data[offset + channel] as f32;
        data[offset + channel] = (src + dst * inv).round().min(255.0) as u8;
    }
    let dst_a = data[offset + 3] as f32;
    data[offset + 3] = (src_a * 255.0 + dst_a * inv).round().min(255.0) as u8;
}

/// Regular face of `family`, matched against the names stored in the fonts
pub fn find_family(db: &Database, family: &str) -> Option<fontdb::ID> {
    let family = family.trim();
    if family.is_empty() {
        return None;
    }

    db.query(&Query {
        families: &[Family::Name(family)],
        ..Query::default()
    })
}
