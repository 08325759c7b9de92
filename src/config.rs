//! Application Configuration Constants
//!
//! Centralized configuration for magic numbers, colors, timings, and defaults.
//! Everything the user can change lives in `config.json` (see `settings`);
//! this module holds what they can't.

/// Window classes and titles
pub mod window {
    /// Window class for the per-monitor dock strip
    pub const DOCK_CLASS_NAME: &str = "EdgeDockStrip";

    /// Window class for the hover label under the strip
    pub const LABEL_CLASS_NAME: &str = "EdgeDockHoverLabel";

    /// Hidden top-level window that receives display change broadcasts
    pub const LISTENER_CLASS_NAME: &str = "EdgeDockDisplayListener";

    /// Title shared by every dock window (visible in Spy++ and task managers)
    pub const DOCK_WINDOW_TITLE: &str = "EdgeDock";
}

/// Timing Configuration
pub mod timing {
    /// Pointer poll interval (milliseconds). Fixed, not user configurable.
    pub const POLL_INTERVAL_MS: u32 = 50;

    /// Timer id used for the pointer poll on the UI thread
    pub const POLL_TIMER_ID: usize = 1;
}

/// Hover label layout
pub mod label {
    /// Horizontal padding around the label text (pixels)
    pub const PADDING_X: u32 = 8;

    /// Vertical padding around the label text (pixels)
    pub const PADDING_Y: u32 = 4;

    /// Gap between the bottom edge of the dock and the label (pixels)
    pub const GAP_BELOW_DOCK: i32 = 2;
}

/// Icon limits
pub mod icons {
    /// Largest accepted ICON_SIZE (pixels)
    pub const MAX_ICON_SIZE: u32 = 512;
}

/// Placeholder icon appearance
pub mod placeholder {
    /// Light gray disc
    pub const CIRCLE_COLOR: [u8; 4] = [200, 200, 200, 255];

    /// Dark gray initial letter
    pub const LETTER_COLOR: [u8; 4] = [100, 100, 100, 255];

    /// Letter height relative to the icon size
    pub const LETTER_SCALE: f32 = 0.5;
}

/// Config file and directory names
pub mod paths {
    /// Name of the configuration file
    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Environment variable that points at an explicit configuration file
    /// - Windows: `set EDGEDOCK_CONFIG=C:\path\to\config.json`
    /// - macOS/Linux: `export EDGEDOCK_CONFIG=/path/to/config.json`
    pub const CONFIG_ENV: &str = "EDGEDOCK_CONFIG";

    /// Directory name used under the platform config/data directories
    pub const APP_DIR_NAME: &str = "EdgeDock";

    /// Name used by the single-instance lock file and named mutex
    pub const INSTANCE_LOCK_NAME: &str = ".edgedock.lock";
}

/// Logging defaults
pub mod logs {
    /// Log level used when the config doesn't set one
    pub const DEFAULT_LOG_LEVEL: &str = "Info";

    /// Log retention period in days
    pub const DEFAULT_RETENTION_DAYS: u32 = 7;

    /// Base name of the rolling log file
    pub const LOG_FILE_NAME: &str = "edgedock.log";
}

/// Color Utilities
pub mod colors {
    /// Convert an RGBA byte array into a tiny-skia color
    pub fn rgba_to_skia(rgba: [u8; 4]) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Expand a JSON-style color (3 or 4 components) into RGBA.
    /// Three components are treated as fully opaque.
    pub fn expand_rgb(components: &[u8]) -> Option<[u8; 4]> {
        match *components {
            [r, g, b] => Some([r, g, b, 255]),
            [r, g, b, a] => Some([r, g, b, a]),
            _ => None,
        }
    }
}
