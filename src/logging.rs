//! Log setup for the dock process
//!
//! Console output always; a daily rolling `edgedock.log` under the local data
//! directory when `LOG_TO_FILE` is set. The level filter sits behind a reload
//! handle so a second `init_logging` call (configuration failure path, then the
//! real settings) only swaps the level.

use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use edgedock_core::config;

lazy_static! {
    static ref FILTER_HANDLE: Mutex<Option<Handle<EnvFilter, Registry>>> = Mutex::new(None);
}

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// `LOG_LEVEL` values accepted in `config.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Off,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Off => "Off",
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// `None` for `Off`
    pub fn tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }

    /// Filter directive for both crates of the dock (binary and library)
    fn directive(self) -> String {
        match self.tracing_level() {
            None => "off".to_string(),
            Some(level) => {
                let level = level.as_str().to_ascii_lowercase();
                format!("edgedock={level},edgedock_core={level}")
            }
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("warning") {
            return Ok(LogLevel::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Invalid log level: {}", s))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// `<local data dir>/EdgeDock/logs`, created on first use
pub fn logs_dir() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("No local data directory for log files")?
        .join(config::paths::APP_DIR_NAME)
        .join("logs");

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    Ok(dir)
}

/// Install the global subscriber, or only change its level if one is already
/// installed. The file sink chosen by the first call stays for the process.
pub fn init_logging(level: LogLevel, log_to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_new(level.directive()).context("Invalid log filter")?;

    let mut slot = FILTER_HANDLE
        .lock()
        .map_err(|_| anyhow!("Log filter handle poisoned"))?;
    if let Some(handle) = slot.as_ref() {
        return handle.reload(filter).context("Failed to change log level");
    }

    let (filter_layer, handle) = tracing_subscriber::reload::Layer::new(filter);

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file = if log_to_file {
        let appender =
            RollingFileAppender::new(Rotation::DAILY, logs_dir()?, config::logs::LOG_FILE_NAME);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(console)
        .with(file)
        .try_init()
        .context("A log subscriber is already installed")?;

    *slot = Some(handle);
    Ok(())
}

/// Rolled files are named `edgedock.log.YYYY-MM-DD`
fn is_dock_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(config::logs::LOG_FILE_NAME))
}

/// Delete dock log files last modified more than `keep_days` before `now`.
/// Unrelated files in the directory are never touched. Returns how many
/// files were removed.
pub fn prune_logs(dir: &Path, keep_days: u32, now: SystemTime) -> Result<usize> {
    let keep = Duration::from_secs(u64::from(keep_days) * SECONDS_PER_DAY);
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_dock_log(&path) {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        let Some(age) = age.filter(|age| *age > keep) else {
            continue;
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                removed += 1;
                tracing::debug!(file = ?path, age_days = age.as_secs() / SECONDS_PER_DAY, "Old log removed");
            }
            Err(e) => tracing::debug!(file = ?path, error = %e, "Old log could not be removed"),
        }
    }

    Ok(removed)
}

/// Prune old logs on a background thread so startup never waits on the disk
pub fn spawn_log_pruning(keep_days: u32) {
    std::thread::spawn(move || {
        let result = logs_dir().and_then(|dir| prune_logs(&dir, keep_days, SystemTime::now()));
        match result {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, keep_days, "Old log files pruned"),
            Err(e) => tracing::warn!(error = %format!("{:#}", e), "Log pruning failed"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_in_any_case() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(" Info ".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn every_level_parses_its_own_name() {
        for level in LogLevel::ALL {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
    }

    #[test]
    fn directives_cover_both_crates() {
        assert_eq!(LogLevel::Off.directive(), "off");
        assert_eq!(LogLevel::Warn.directive(), "edgedock=warn,edgedock_core=warn");
        assert!(EnvFilter::try_new(LogLevel::Trace.directive()).is_ok());
    }

    #[test]
    fn pruning_removes_only_old_dock_logs() {
        let dir = tempfile::tempdir().unwrap();
        let rolled = dir.path().join(format!("{}.2026-01-01", config::logs::LOG_FILE_NAME));
        let foreign = dir.path().join("notes.txt");
        fs::write(&rolled, "log").unwrap();
        fs::write(&foreign, "keep").unwrap();

        // Fresh files survive
        assert_eq!(prune_logs(dir.path(), 7, SystemTime::now()).unwrap(), 0);

        // Ten days later the rolled log is past retention
        let later = SystemTime::now() + Duration::from_secs(10 * SECONDS_PER_DAY);
        assert_eq!(prune_logs(dir.path(), 7, later).unwrap(), 1);
        assert!(!rolled.exists());
        assert!(foreign.exists());
    }
}
