use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use congestion_core::settings::APP_DIR_NAME;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file used in dashboard mode when `--log-file` is not given.
pub const DEFAULT_LOG_FILE: &str = "dashboard.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// `~/.congestion-dashboard/`, or `./.congestion-dashboard/` without a home.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Ensure the `~/.congestion-dashboard/` hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.congestion-dashboard/`
/// - `~/.congestion-dashboard/logs/`
/// - `~/.congestion-dashboard/data/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(dir.join("logs"))
        .with_context(|| format!("creating {}", dir.join("logs").display()))?;
    std::fs::create_dir_all(dir.join("data"))
        .with_context(|| format!("creating {}", dir.join("data").display()))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, used by report mode.
    Stderr,
    /// Append to a file, used while the terminal UI owns the screen.
    File(PathBuf),
}

impl LogTarget {
    /// File target for the dashboard: `--log-file` or the default under `logs/`.
    pub fn for_dashboard(log_file: Option<&Path>) -> Self {
        LogTarget::File(
            log_file
                .map(Path::to_path_buf)
                .unwrap_or_else(|| app_dir().join("logs").join(DEFAULT_LOG_FILE)),
        )
    }
}

/// Map a `--log-level` value onto a tracing filter directive.
///
/// Unknown values are passed through so `RUST_LOG`-style directives still work.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Falls back to `"info"` if the level string is not a valid directive.
pub fn setup_logging(log_level: &str, target: &LogTarget) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    match target {
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
    }

    Ok(())
}

// ── Data-directory discovery ───────────────────────────────────────────────────

/// Pick the directory datasets are read from.
///
/// An explicit `--data-dir` always wins. Otherwise the first of these that
/// holds the primary or fallback file is used:
/// 1. the current directory
/// 2. `./data/`
/// 3. `~/.congestion-dashboard/data/`
///
/// When none does, the current directory is returned and the load reports
/// the missing files.
pub fn resolve_data_dir(explicit: Option<&Path>, primary: &str, fallback: &str) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }

    let cwd = PathBuf::from(".");
    let candidates = [cwd.clone(), cwd.join("data"), app_dir().join("data")];
    candidates
        .into_iter()
        .find(|dir| dir.join(primary).is_file() || dir.join(fallback).is_file())
        .unwrap_or(cwd)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
