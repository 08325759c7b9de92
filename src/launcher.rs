//! Fire-and-forget process launch for dock buttons

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::traits::AppLauncher;

/// Spawns the target as an independent process. The child is never waited on
/// and its output is not captured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl AppLauncher for ProcessLauncher {
    fn launch(&self, path: &Path) -> Result<()> {
        launch(path)
    }
}

pub fn launch(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let mut command = Command::new(path);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        command.current_dir(dir);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(detached_flags());
    }

    let child = command
        .spawn()
        .with_context(|| format!("Failed to launch {}", path.display()))?;

    tracing::info!(target_path = ?path, pid = child.id(), "Launched application");
    // Dropping the handle doesn't kill or wait for the child
    drop(child);
    Ok(())
}

/// No inherited console, and our Ctrl+C never reaches the child
#[cfg(windows)]
fn detached_flags() -> u32 {
    use windows::Win32::System::Threading::{CREATE_NEW_PROCESS_GROUP, DETACHED_PROCESS};
    (DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP).0
}
