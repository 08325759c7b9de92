use std::sync::Arc;

use edgedock_core::icon::{platform_icon_source, IconLoader};
use edgedock_core::launcher::ProcessLauncher;
use edgedock_core::manager::DockManager;
use edgedock_core::platform;
use edgedock_core::render::DockPainter;
use edgedock_core::text::TextRasterizer;

mod app_bootstrap;
mod logging;
mod single_instance;

// ============================================================================
// Main
// ============================================================================

fn main() {
    // Single instance, configuration, logging, panic hook
    app_bootstrap::acquire_single_instance_or_exit();
    let (settings, config_path) = app_bootstrap::load_settings_or_exit();
    app_bootstrap::init_logging(&settings);
    app_bootstrap::install_panic_hook();

    let settings = Arc::new(settings);
    let text = TextRasterizer::load(&settings.hover_text_font).map(Arc::new);
    let painter = Arc::new(DockPainter::new(Arc::clone(&settings), text.clone()));
    app_bootstrap::log_active_settings(&settings, &config_path, painter.has_font());

    // Icons are resolved once, up front; every dock shares them
    let icons = match IconLoader::new(settings.icon_size, platform_icon_source(), text) {
        Ok(icons) => icons,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Failed to set up icon loading");
            eprintln!("EdgeDock failed: {:#}", e);
            app_bootstrap::perform_cleanup();
            std::process::exit(1);
        }
    };
    let mut manager = DockManager::new(
        Arc::clone(&settings),
        &icons,
        painter,
        Box::new(ProcessLauncher),
    );

    let exit_code = match platform::run(&mut manager) {
        Ok(()) => {
            tracing::info!("Application exiting normally");
            0
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Dock loop failed");
            eprintln!("EdgeDock failed: {:#}", e);
            1
        }
    };

    app_bootstrap::perform_cleanup();
    std::process::exit(exit_code);
}
