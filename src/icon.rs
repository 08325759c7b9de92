//! Icon resolution for launcher buttons
//!
//! Order, first success wins:
//! 1. configured image file (PNG, JPEG, BMP, ICO, GIF)
//! 2. icon embedded in the target executable (platform capability)
//! 3. synthesized placeholder: gray disc with the name's initial
//!
//! Every failure falls through to the next step with a log line; the
//! placeholder can't fail, so resolution always yields a `size × size` image.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{FillRule, FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Transform};

use crate::config;
use crate::config::colors::rgba_to_skia;
use crate::platform_utils::is_blank;
use crate::text::TextRasterizer;

/// Extracts the primary icon of an executable file
pub trait ExecutableIconSource {
    fn extract_icon(&self, executable: &Path) -> Result<Pixmap>;
}

/// For platforms without executable icon resources: always declines, so
/// resolution goes straight to the placeholder
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExecutableIcons;

impl ExecutableIconSource for NoExecutableIcons {
    fn extract_icon(&self, _executable: &Path) -> Result<Pixmap> {
        anyhow::bail!("Executable icon extraction is not supported on this platform")
    }
}

/// The executable icon source for the current platform
pub fn platform_icon_source() -> Box<dyn ExecutableIconSource> {
    #[cfg(target_os = "windows")]
    {
        Box::new(crate::platform::ShellIconSource)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(NoExecutableIcons)
    }
}

/// resolve_icon(name, image_path?, executable_path?) -> square image
pub trait IconResolver {
    fn resolve_icon(
        &self,
        name: &str,
        image_path: Option<&Path>,
        executable_path: Option<&Path>,
    ) -> Pixmap;
}

/// Which resolution step produced an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconOrigin {
    ImageFile,
    Executable,
    Placeholder,
}

pub struct IconLoader {
    size: u32,
    executables: Box<dyn ExecutableIconSource>,
    glyphs: Option<Arc<TextRasterizer>>,
    // Last resort when even the placeholder can't be drawn
    blank: Pixmap,
}

impl IconLoader {
    pub fn new(
        size: u32,
        executables: Box<dyn ExecutableIconSource>,
        glyphs: Option<Arc<TextRasterizer>>,
    ) -> Result<Self> {
        let blank = blank_square(size)
            .with_context(|| format!("Icon size {} can't be rendered", size))?;
        Ok(Self {
            size,
            executables,
            glyphs,
            blank,
        })
    }

    pub fn resolve_with_origin(
        &self,
        name: &str,
        image_path: Option<&Path>,
        executable_path: Option<&Path>,
    ) -> (Pixmap, IconOrigin) {
        tracing::debug!(name, "Loading icon");

        if let Some(path) = image_path {
            if path.is_file() {
                match decode_image(path) {
                    Ok(image) => {
                        if let Some(icon) = fit_to_square(&image, self.size) {
                            tracing::debug!(name, image = ?path, "Loaded icon image");
                            return (icon, IconOrigin::ImageFile);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(name, image = ?path, error = %format!("{:#}", e), "Failed to decode icon image");
                    }
                }
            } else {
                tracing::warn!(name, image = ?path, "Icon image does not exist");
            }
        }

        if let Some(exe) = executable_path {
            if exe.exists() {
                match self.executables.extract_icon(exe) {
                    Ok(image) if is_blank(&image) => {
                        tracing::debug!(name, executable = ?exe, "Executable icon is fully transparent");
                    }
                    Ok(image) => {
                        tracing::debug!(
                            name,
                            executable = ?exe,
                            width = image.width(),
                            height = image.height(),
                            "Extracted icon from executable"
                        );
                        if let Some(icon) = fit_to_square(&image, self.size) {
                            return (icon, IconOrigin::Executable);
                        }
                    }
                    Err(e) => {
                        tracing::debug!(name, executable = ?exe, error = %e, "No icon from executable");
                    }
                }
            }
        }

        tracing::debug!(name, "Creating placeholder icon");
        let icon = placeholder_icon(name, self.size, self.glyphs.as_deref())
            .unwrap_or_else(|| self.blank.clone());
        (icon, IconOrigin::Placeholder)
    }
}

impl IconResolver for IconLoader {
    fn resolve_icon(
        &self,
        name: &str,
        image_path: Option<&Path>,
        executable_path: Option<&Path>,
    ) -> Pixmap {
        let (icon, origin) = self.resolve_with_origin(name, image_path, executable_path);
        tracing::debug!(name, ?origin, "Icon resolved");
        icon
    }
}

/// Decode any supported image format into a premultiplied pixmap
pub fn decode_image(path: &Path) -> Result<Pixmap> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();

    let mut data = image.into_raw();
    for px in data.chunks_exact_mut(4) {
        let alpha = u16::from(px[3]);
        for channel in &mut px[..3] {
            *channel = ((u16::from(*channel) * alpha + 127) / 255) as u8;
        }
    }

    let size = IntSize::from_wh(width, height).context("Icon image is empty")?;
    Pixmap::from_vec(data, size).context("Icon image has an invalid size")
}

/// Transparent square canvas, `size` clamped to what settings validation allows
fn blank_square(size: u32) -> Option<Pixmap> {
    let size = size.clamp(1, config::icons::MAX_ICON_SIZE);
    Pixmap::new(size, size)
}

/// Scale `image` to fit a `size × size` square, keeping its aspect ratio and
/// centering it. Images that already match are returned as-is.
pub fn fit_to_square(image: &Pixmap, size: u32) -> Option<Pixmap> {
    if image.width() == size && image.height() == size {
        return Some(image.clone());
    }

    let mut out = blank_square(size)?;
    let target = out.width() as f32;
    let scale = (target / image.width() as f32).min(target / image.height() as f32);
    let offset_x = (target - image.width() as f32 * scale) / 2.0;
    let offset_y = (target - image.height() as f32 * scale) / 2.0;

    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(
        0,
        0,
        image.as_ref(),
        &paint,
        Transform::from_row(scale, 0.0, 0.0, scale, offset_x, offset_y),
        None,
    );
    Some(out)
}

/// Uppercased first character of the name, if any
pub fn placeholder_letter(name: &str) -> Option<String> {
    name.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
}

/// Gray disc spanning the square, with the name's initial centered on it
pub fn placeholder_icon(name: &str, size: u32, glyphs: Option<&TextRasterizer>) -> Option<Pixmap> {
    let mut pixmap = blank_square(size)?;
    let side = pixmap.width();
    let radius = side as f32 / 2.0;

    if let Some(circle) = PathBuilder::from_circle(radius, radius, radius) {
        let mut paint = Paint::default();
        paint.set_color(rgba_to_skia(config::placeholder::CIRCLE_COLOR));
        paint.anti_alias = true;
        pixmap.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
    }

    if let (Some(glyphs), Some(letter)) = (glyphs, placeholder_letter(name)) {
        glyphs.draw_centered(
            &mut pixmap,
            &letter,
            (0, 0, side, side),
            side as f32 * config::placeholder::LETTER_SCALE,
            config::placeholder::LETTER_COLOR,
        );
    }

    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    struct FixedIcon(u32, u32);

    impl ExecutableIconSource for FixedIcon {
        fn extract_icon(&self, _executable: &Path) -> Result<Pixmap> {
            let mut pixmap = Pixmap::new(self.0, self.1).unwrap();
            pixmap.fill(Color::from_rgba8(0, 0, 255, 255));
            Ok(pixmap)
        }
    }

    #[test]
    fn placeholder_letter_is_uppercased() {
        assert_eq!(placeholder_letter("notepad"), Some("N".to_string()));
        assert_eq!(placeholder_letter("  vim"), Some("V".to_string()));
        assert_eq!(placeholder_letter("ßtraße"), Some("SS".to_string()));
        assert_eq!(placeholder_letter(""), None);
    }

    #[test]
    fn placeholder_is_a_disc() {
        let icon = placeholder_icon("Terminal", 48, None).unwrap();
        assert_eq!((icon.width(), icon.height()), (48, 48));

        let center = icon.pixel(24, 24).unwrap();
        assert_eq!(center.alpha(), 255);
        assert_eq!(center.red(), config::placeholder::CIRCLE_COLOR[0]);
        // Corners are outside the circle
        assert_eq!(icon.pixel(0, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn fit_keeps_aspect_ratio_and_centers() {
        let mut wide = Pixmap::new(100, 50).unwrap();
        wide.fill(Color::from_rgba8(255, 0, 0, 255));

        let fitted = fit_to_square(&wide, 40).unwrap();
        assert_eq!((fitted.width(), fitted.height()), (40, 40));
        // 100x50 -> 40x20, centered vertically: rows 10..30 painted
        assert_eq!(fitted.pixel(20, 2).unwrap().alpha(), 0);
        assert_eq!(fitted.pixel(20, 20).unwrap().alpha(), 255);
        assert_eq!(fitted.pixel(20, 37).unwrap().alpha(), 0);
    }

    #[test]
    fn fit_returns_matching_images_unchanged() {
        let mut exact = Pixmap::new(32, 32).unwrap();
        exact.fill(Color::from_rgba8(1, 2, 3, 255));
        assert_eq!(fit_to_square(&exact, 32).unwrap().data(), exact.data());
    }

    #[test]
    fn executable_icon_is_used_when_image_missing() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("tool.exe");
        std::fs::write(&exe, b"MZ").unwrap();

        let loader = IconLoader::new(64, Box::new(FixedIcon(32, 32)), None).unwrap();
        let (icon, origin) =
            loader.resolve_with_origin("Tool", Some(&dir.path().join("missing.png")), Some(&exe));
        assert_eq!(origin, IconOrigin::Executable);
        assert_eq!((icon.width(), icon.height()), (64, 64));
        assert_eq!(icon.pixel(32, 32).unwrap().blue(), 255);
    }

    #[test]
    fn missing_executable_skips_extraction() {
        let loader = IconLoader::new(48, Box::new(FixedIcon(32, 32)), None).unwrap();
        let (_, origin) =
            loader.resolve_with_origin("Ghost", None, Some(Path::new("/no/such/ghost.exe")));
        assert_eq!(origin, IconOrigin::Placeholder);
    }

    #[test]
    fn bmp_image_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.bmp");
        image::RgbImage::from_pixel(16, 16, image::Rgb([0, 255, 0]))
            .save(&path)
            .unwrap();

        let loader = IconLoader::new(32, Box::new(NoExecutableIcons), None).unwrap();
        let (icon, origin) = loader.resolve_with_origin("Tool", Some(&path), None);
        assert_eq!(origin, IconOrigin::ImageFile);
        let center = icon.pixel(16, 16).unwrap();
        assert_eq!((center.red(), center.green(), center.alpha()), (0, 255, 255));
    }

    #[test]
    fn decoded_pixels_are_premultiplied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("half.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 100, 0, 128]))
            .save(&path)
            .unwrap();

        let pixmap = decode_image(&path).unwrap();
        let px = pixmap.pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (128, 50, 0, 128));
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(decode_image(&path).is_err());
    }

    #[test]
    fn unsupported_platform_source_declines() {
        assert!(NoExecutableIcons.extract_icon(Path::new("anything")).is_err());
    }
}
