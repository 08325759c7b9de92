//! EdgeDock - auto-hiding launcher docks along the top edge of every monitor
//!
//! The library holds everything except process bootstrap: settings, icon
//! resolution, rendering, the per-monitor dock model, the dock manager and the
//! platform backend.

// Configuration constants
pub mod config;

// Settings model and loading
pub mod settings;
pub mod settings_io;

// Geometry and monitor descriptors
pub mod geometry;
pub mod monitors;

// Platform seams
pub mod traits;

// Platform-agnostic pixel helpers
pub mod platform_utils;

// Dock model
pub mod activation;
pub mod dock;
pub mod icon;
pub mod launcher;
pub mod layout;
pub mod manager;
pub mod render;
pub mod text;

// Platform backend
pub mod platform;

// Re-export commonly used types
pub use dock::{Dock, LauncherButton};
pub use manager::{DockManager, MonitorChange, PlatformEvent};
pub use settings::{DockSettings, Shortcut};
