//! Software rendering of the dock strip and the hover label.
//!
//! Frames are plain tiny-skia pixmaps; platform surfaces only upload them.

use std::sync::Arc;
use tiny_skia::{Paint, Pixmap, PixmapPaint, Rect as SkRect, Transform};

use crate::config;
use crate::config::colors::rgba_to_skia;
use crate::dock::LauncherButton;
use crate::layout;
use crate::settings::DockSettings;
use crate::text::TextRasterizer;

pub struct DockPainter {
    settings: Arc<DockSettings>,
    text: Option<Arc<TextRasterizer>>,
}

impl DockPainter {
    pub fn new(settings: Arc<DockSettings>, text: Option<Arc<TextRasterizer>>) -> Self {
        Self { settings, text }
    }

    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    /// Background, hover highlight and icons for one dock. `None` only when the
    /// size can't back a pixmap (zero or absurdly large).
    pub fn render_dock(
        &self,
        width: u32,
        height: u32,
        buttons: &[LauncherButton],
        hovered: Option<usize>,
    ) -> Option<Pixmap> {
        let mut frame = Pixmap::new(width, height)?;
        frame.fill(rgba_to_skia(self.settings.dock_background_color));

        if let Some(button) = hovered.and_then(|i| buttons.get(i)) {
            if let Some(rect) = SkRect::from_xywh(
                button.rect.x as f32,
                button.rect.y as f32,
                button.rect.width as f32,
                button.rect.height as f32,
            ) {
                let mut paint = Paint::default();
                paint.set_color(rgba_to_skia(self.settings.hover_background_color));
                frame.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }

        let icon_paint = PixmapPaint::default();
        for button in buttons {
            let icon: &Pixmap = &button.icon;
            let (x, y) = layout::icon_origin(&button.rect, icon.width());
            frame.draw_pixmap(x, y, icon.as_ref(), &icon_paint, Transform::identity(), None);
        }

        Some(frame)
    }

    /// Label pixmap for `text`: padded text on the dock background color.
    /// `None` when there's nothing to draw or no font is available.
    pub fn render_label(&self, text: &str) -> Option<Pixmap> {
        let glyphs = self.text.as_ref()?;
        if text.is_empty() {
            return None;
        }

        let size = self.settings.hover_text_size;
        let extent = glyphs.measure(text, size);
        let width = extent.width + 2 * config::label::PADDING_X;
        let height = extent.height + 2 * config::label::PADDING_Y;

        let mut frame = Pixmap::new(width, height)?;
        frame.fill(rgba_to_skia(self.settings.dock_background_color));
        glyphs.draw(
            &mut frame,
            text,
            config::label::PADDING_X as i32,
            config::label::PADDING_Y as i32,
            size,
            self.settings.hover_text_color,
        );
        Some(frame)
    }
}
