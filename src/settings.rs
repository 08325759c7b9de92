use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config;

/// Shortcut name that turns an entry into an empty slot
pub const SPACER_NAME: &str = "Spacer";

/// Configured launch target
#[derive(Debug, Clone, PartialEq)]
pub struct Launcher {
    pub name: String,
    pub path: PathBuf,
    pub icon_path: Option<PathBuf>,
}

/// One entry of the `shortcuts` list: a launcher or a layout spacer.
///
/// On disk both are plain objects; `{"name": "Spacer"}` is the spacer sentinel and
/// everything else must carry a `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawShortcut", into = "RawShortcut")]
pub enum Shortcut {
    Launcher(Launcher),
    Spacer,
}

impl Shortcut {
    pub fn is_spacer(&self) -> bool {
        matches!(self, Shortcut::Spacer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawShortcut {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon_path: Option<PathBuf>,
}

impl TryFrom<RawShortcut> for Shortcut {
    type Error = String;

    fn try_from(raw: RawShortcut) -> std::result::Result<Self, Self::Error> {
        if raw.name == SPACER_NAME {
            return Ok(Shortcut::Spacer);
        }

        match raw.path {
            Some(path) => Ok(Shortcut::Launcher(Launcher {
                name: raw.name,
                path,
                icon_path: raw.icon_path,
            })),
            None => Err(format!("shortcut '{}' has no \"path\"", raw.name)),
        }
    }
}

impl From<Shortcut> for RawShortcut {
    fn from(shortcut: Shortcut) -> Self {
        match shortcut {
            Shortcut::Spacer => RawShortcut {
                name: SPACER_NAME.to_string(),
                path: None,
                icon_path: None,
            },
            Shortcut::Launcher(launcher) => RawShortcut {
                name: launcher.name,
                path: Some(launcher.path),
                icon_path: launcher.icon_path,
            },
        }
    }
}

/// Dock configuration, loaded once from `config.json` and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DockSettings {
    // Layout
    pub icon_size: u32,
    pub icon_padding: u32,

    // Colors [r, g, b, a]
    pub dock_background_color: [u8; 4],
    pub hover_background_color: [u8; 4],

    // Hover label
    pub hover_text_color: [u8; 4],
    pub hover_text_font: String,
    pub hover_text_size: f32,

    // Fraction of the monitor width that triggers the dock
    pub activation_percentage: f64,

    #[serde(rename = "shortcuts")]
    pub shortcuts: Vec<Shortcut>,

    // Logging
    #[serde(default = "default_log_level")]
    pub log_level: String, // "Off", "Error", "Warn", "Info", "Debug", "Trace"
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,
}

// Default functions for serde
fn default_log_level() -> String {
    config::logs::DEFAULT_LOG_LEVEL.to_string()
}

fn default_log_to_file() -> bool {
    true
}

fn default_log_retention_days() -> u32 {
    config::logs::DEFAULT_RETENTION_DAYS
}

impl DockSettings {
    /// Side length of one button slot: the icon plus padding on both sides
    pub fn button_footprint(&self) -> u32 {
        self.icon_size + 2 * self.icon_padding
    }

    /// The dock strip is exactly one button tall
    pub fn dock_height(&self) -> u32 {
        self.button_footprint()
    }

    pub fn launchers(&self) -> impl Iterator<Item = &Launcher> {
        self.shortcuts.iter().filter_map(|s| match s {
            Shortcut::Launcher(l) => Some(l),
            Shortcut::Spacer => None,
        })
    }

    /// Reject values serde accepts but the dock can't work with
    pub fn validate(&self) -> Result<()> {
        if self.icon_size == 0 || self.icon_size > config::icons::MAX_ICON_SIZE {
            bail!(
                "ICON_SIZE must be between 1 and {}, got {}",
                config::icons::MAX_ICON_SIZE,
                self.icon_size
            );
        }
        if self.icon_padding > config::icons::MAX_ICON_SIZE {
            bail!("ICON_PADDING is too large: {}", self.icon_padding);
        }
        if !self.hover_text_size.is_finite() || self.hover_text_size <= 0.0 {
            bail!(
                "HOVER_TEXT_SIZE must be a positive number, got {}",
                self.hover_text_size
            );
        }
        if !self.activation_percentage.is_finite()
            || self.activation_percentage <= 0.0
            || self.activation_percentage > 1.0
        {
            bail!(
                "ACTIVATION_PERCENTAGE must be a fraction in (0, 1], got {}",
                self.activation_percentage
            );
        }
        Ok(())
    }
}
