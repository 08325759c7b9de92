//! Stub backend for targets without a dock implementation

use anyhow::{bail, Result};

use crate::manager::DockManager;

pub fn platform_name() -> &'static str {
    std::env::consts::OS
}

/// Always fails: there is no windowing backend for this target
pub fn run(manager: &mut DockManager) -> Result<()> {
    manager.shutdown();
    bail!(
        "EdgeDock has no windowing backend for {} (only Windows is supported)",
        platform_name()
    )
}
