use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config;
use crate::settings::{DockSettings, Shortcut};

pub fn edgedock_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(config::paths::APP_DIR_NAME))
}

/// Places a `config.json` may live, in priority order:
/// 1. `EDGEDOCK_CONFIG` (explicit file)
/// 2. next to the executable
/// 3. the per-user config directory
pub fn candidate_config_paths() -> Vec<PathBuf> {
    let env_path = std::env::var_os(config::paths::CONFIG_ENV).map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    candidate_config_paths_from(env_path, exe_dir, edgedock_config_dir())
}

pub fn candidate_config_paths_from(
    env_path: Option<PathBuf>,
    exe_dir: Option<PathBuf>,
    user_config_dir: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        paths.push(p);
    }
    if let Some(dir) = exe_dir {
        paths.push(dir.join(config::paths::CONFIG_FILE_NAME));
    }
    if let Some(dir) = user_config_dir {
        paths.push(dir.join(config::paths::CONFIG_FILE_NAME));
    }
    paths
}

/// First existing candidate, or an error naming every place that was searched
pub fn locate_config_file(candidates: &[PathBuf]) -> Result<PathBuf> {
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }

    let searched = candidates
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    anyhow::bail!(
        "No {} found. Searched:\n{}",
        config::paths::CONFIG_FILE_NAME,
        searched
    )
}

/// Migrate older config files into the current schema.
/// - DOCK_SIZE -> ICON_SIZE, DOCK_SPACING -> ICON_PADDING (only when the new key is absent)
/// - [r, g, b] colors -> [r, g, b, 255]
pub fn sanitize_settings_json(value: &mut Value) {
    let Value::Object(obj) = value else {
        return;
    };

    for (legacy, current) in [("DOCK_SIZE", "ICON_SIZE"), ("DOCK_SPACING", "ICON_PADDING")] {
        if let Some(v) = obj.remove(legacy) {
            if !obj.contains_key(current) {
                obj.insert(current.to_string(), v);
            }
        }
    }

    for key in [
        "DOCK_BACKGROUND_COLOR",
        "HOVER_BACKGROUND_COLOR",
        "HOVER_TEXT_COLOR",
    ] {
        // Any non-byte component leaves the value alone so serde reports it
        let components: Option<Vec<u8>> = obj.get(key).and_then(|v| v.as_array()).and_then(|arr| {
            arr.iter()
                .map(|c| c.as_u64().and_then(|c| u8::try_from(c).ok()))
                .collect()
        });

        if let Some(rgba) = components.and_then(|c| config::colors::expand_rgb(&c)) {
            obj.insert(key.to_string(), serde_json::json!(rgba));
        }
    }
}

/// Parse and validate a config document. Relative shortcut paths are resolved
/// against `base_dir` when given.
pub fn parse_settings(raw: &str, base_dir: Option<&Path>) -> Result<DockSettings> {
    let mut value: Value = serde_json::from_str(raw).context("Config is not valid JSON")?;
    sanitize_settings_json(&mut value);

    let mut settings: DockSettings =
        serde_json::from_value(value).context("Config has missing or invalid fields")?;
    settings.validate()?;

    if let Some(base) = base_dir {
        resolve_relative_paths(&mut settings, base);
    }

    Ok(settings)
}

pub fn load_settings_from_path(path: &Path) -> Result<DockSettings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_settings(&raw, path.parent())
        .with_context(|| format!("Invalid config file {}", path.display()))
}

/// Locate and load the configuration. Returns the path that was used.
pub fn load_settings() -> Result<(DockSettings, PathBuf)> {
    let path = locate_config_file(&candidate_config_paths())?;
    let settings = load_settings_from_path(&path)?;
    Ok((settings, path))
}

fn resolve_relative_paths(settings: &mut DockSettings, base: &Path) {
    for shortcut in settings.shortcuts.iter_mut() {
        if let Shortcut::Launcher(launcher) = shortcut {
            if launcher.path.is_relative() && base.join(&launcher.path).exists() {
                launcher.path = base.join(&launcher.path);
            }
            if let Some(icon) = launcher.icon_path.as_mut() {
                if icon.is_relative() {
                    *icon = base.join(&*icon);
                }
            }
        }
    }
}
