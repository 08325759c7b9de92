//! Platform Abstraction Layer
//!
//! The dock model only sees the traits in `crate::traits`. Windows gets the
//! Win32 backend; every other target gets a stub that reports the platform as
//! unsupported, so the model and its tests still build there.

#[cfg(target_os = "windows")]
mod win32;
#[cfg(target_os = "windows")]
pub use win32::*;

#[cfg(not(target_os = "windows"))]
mod unsupported;
#[cfg(not(target_os = "windows"))]
pub use unsupported::*;
