use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::{logging, single_instance};
use edgedock_core::config;
use edgedock_core::settings::DockSettings;
use edgedock_core::settings_io;

lazy_static! {
    // Global flag to track if cleanup has been performed
    static ref CLEANUP_PERFORMED: AtomicBool = AtomicBool::new(false);
    // Single instance lock - prevents multiple docks from stacking on the same monitor
    static ref SINGLE_INSTANCE_LOCK: Mutex<Option<single_instance::SingleInstanceLock>> =
        Mutex::new(None);
}

/// Acquire the single instance lock or exit if another instance is running.
pub(crate) fn acquire_single_instance_or_exit() {
    let instance_lock = match single_instance::SingleInstanceLock::acquire() {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("EdgeDock is already running! ({})", e);

            #[cfg(not(windows))]
            {
                if let Some(pid) = single_instance::SingleInstanceLock::read_existing_pid() {
                    eprintln!("Existing instance PID: {}", pid);
                }
            }

            std::process::exit(1);
        }
    };

    // Held for the entire application lifetime
    if let Ok(mut slot) = SINGLE_INSTANCE_LOCK.lock() {
        *slot = Some(instance_lock);
    }
}

/// Load `config.json`. A missing or invalid file is fatal: it is reported on
/// stderr and in the default log, then the process exits with code 1.
pub(crate) fn load_settings_or_exit() -> (DockSettings, PathBuf) {
    match settings_io::load_settings() {
        Ok(loaded) => loaded,
        Err(e) => {
            let default_level = config::logs::DEFAULT_LOG_LEVEL
                .parse::<logging::LogLevel>()
                .unwrap_or(logging::LogLevel::Info);
            if logging::init_logging(default_level, true).is_ok() {
                tracing::error!(error = %format!("{:#}", e), "Failed to load configuration");
            }
            eprintln!("Failed to load configuration: {:#}", e);

            perform_cleanup();
            std::process::exit(1);
        }
    }
}

/// Initialize logging system from the loaded settings.
pub(crate) fn init_logging(settings: &DockSettings) {
    let log_level = match settings.log_level.parse::<logging::LogLevel>() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}, falling back to {}", e, config::logs::DEFAULT_LOG_LEVEL);
            logging::LogLevel::Info
        }
    };

    if let Err(e) = logging::init_logging(log_level, settings.log_to_file) {
        eprintln!("Failed to initialize logging: {}", e);
    } else {
        tracing::info!("***********************************************************************");
        tracing::info!("*                          EDGEDOCK STARTUP                           *");
        tracing::info!("***********************************************************************");
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            platform = edgedock_core::platform::platform_name(),
            log_level = %log_level,
            "Application started"
        );
        tracing::info!("***********************************************************************");

        tracing::debug!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "Platform details"
        );
    }

    if settings.log_to_file {
        logging::spawn_log_pruning(settings.log_retention_days);
    }
}

/// Set up panic hook for cleanup on crash.
pub(crate) fn install_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!(
            ?panic_info,
            "Application panic detected! Performing emergency cleanup"
        );
        log::error!("Application panic detected! Performing emergency cleanup...");
        perform_cleanup();
        default_panic(panic_info);
    }));
}

/// Log active settings for debugging.
pub(crate) fn log_active_settings(settings: &DockSettings, source: &Path, has_font: bool) {
    tracing::info!(config = ?source, "Configuration loaded");
    tracing::debug!(
        icon_size = settings.icon_size,
        icon_padding = settings.icon_padding,
        dock_height = settings.dock_height(),
        dock_background_color = ?settings.dock_background_color,
        hover_background_color = ?settings.hover_background_color,
        hover_text_color = ?settings.hover_text_color,
        hover_text_font = %settings.hover_text_font,
        hover_text_size = settings.hover_text_size,
        font_loaded = has_font,
        activation_percentage = settings.activation_percentage,
        shortcuts = settings.shortcuts.len(),
        launchers = settings.launchers().count(),
        log_level = %settings.log_level,
        log_to_file = settings.log_to_file,
        log_retention_days = settings.log_retention_days,
        "Settings configuration"
    );
    if !has_font {
        tracing::warn!(
            font = %settings.hover_text_font,
            "No usable font found: hover labels and placeholder letters are disabled"
        );
    }
}

/// Release process-wide resources.
/// This function is safe to call multiple times - it will only execute once.
pub(crate) fn perform_cleanup() {
    if CLEANUP_PERFORMED.swap(true, Ordering::SeqCst) {
        tracing::debug!("Cleanup already performed, skipping");
        return;
    }

    tracing::info!("Performing cleanup");

    // try_lock: the panic hook may run while the lock is held
    if let Ok(mut lock) = SINGLE_INSTANCE_LOCK.try_lock() {
        if lock.is_some() {
            *lock = None;
            tracing::debug!("Single instance lock released");
        }
    }

    tracing::info!("Cleanup completed successfully");
}
