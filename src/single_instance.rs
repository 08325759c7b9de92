//! One dock process per desktop session
//!
//! A second process would stack another dock on every monitor, so startup
//! takes an exclusive, process-lifetime lock:
//! - Windows: session-local named mutex
//! - Unix: non-blocking `flock` on a lock file that records the holder's PID

use anyhow::Result;

/// Held for the life of the process; dropping it releases the lock
pub struct SingleInstanceLock {
    _guard: imp::Guard,
}

impl SingleInstanceLock {
    /// Fails when another EdgeDock process holds the lock
    pub fn acquire() -> Result<Self> {
        Ok(Self {
            _guard: imp::acquire()?,
        })
    }

    /// PID written by the process holding the lock
    #[cfg(not(windows))]
    pub fn read_existing_pid() -> Option<u32> {
        let path = imp::lock_path().ok()?;
        std::fs::read_to_string(path).ok()?.trim().parse().ok()
    }
}

#[cfg(windows)]
mod imp {
    use anyhow::{bail, Context, Result};
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, HANDLE};
    use windows::Win32::System::Threading::CreateMutexW;

    const MUTEX_NAME: &str = "Local\\EdgeDock_SingleInstance_Mutex";

    pub struct Guard(HANDLE);

    // SAFETY: the mutex handle is only closed in Drop and never used otherwise
    unsafe impl Send for Guard {}
    unsafe impl Sync for Guard {}

    pub fn acquire() -> Result<Guard> {
        let name: Vec<u16> = MUTEX_NAME.encode_utf16().chain(std::iter::once(0)).collect();

        unsafe {
            let handle = CreateMutexW(None, true, PCWSTR(name.as_ptr()))
                .context("Failed to create instance mutex")?;

            if GetLastError() == ERROR_ALREADY_EXISTS {
                let _ = CloseHandle(handle);
                bail!("Another instance of EdgeDock is already running");
            }

            tracing::info!(mutex = MUTEX_NAME, "Single instance lock acquired");
            Ok(Guard(handle))
        }
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            unsafe {
                let _ = CloseHandle(self.0);
            }
            tracing::info!("Single instance lock released");
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use anyhow::{bail, Context, Result};
    use std::fs::{File, OpenOptions};
    use std::io::{Seek, SeekFrom, Write};
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;
    use std::path::{Path, PathBuf};

    use edgedock_core::config;

    /// Keeps the lock file open; closing it drops the `flock`
    pub struct Guard {
        _file: File,
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            tracing::info!("Single instance lock released");
        }
    }

    /// `<config dir>/EdgeDock/.edgedock.lock`
    pub fn lock_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("No config directory for the instance lock")?;
        Ok(dir
            .join(config::paths::APP_DIR_NAME)
            .join(config::paths::INSTANCE_LOCK_NAME))
    }

    pub fn acquire() -> Result<Guard> {
        acquire_at(&lock_path()?)
    }

    pub fn acquire_at(path: &Path) -> Result<Guard> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        // Opened without truncation: the holder's PID must survive a failed attempt
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o644)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } != 0 {
            bail!("Another instance of EdgeDock is already running");
        }

        let pid = std::process::id();
        file.set_len(0).context("Failed to clear lock file")?;
        file.seek(SeekFrom::Start(0)).context("Failed to rewind lock file")?;
        write!(file, "{}", pid).context("Failed to record PID in lock file")?;
        file.flush().context("Failed to flush lock file")?;

        tracing::info!(lock = ?path, pid, "Single instance lock acquired");
        Ok(Guard { _file: file })
    }

}
