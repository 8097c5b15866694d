use std::collections::VecDeque;
use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, OnceLock,
};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const DIAG_ENV: &str = "REHBER_DIAG";
const RECENT_ERRORS_CAP: usize = 50;

static DIAG_ENABLED: AtomicBool = AtomicBool::new(false);
static DIAG_ENABLED_INIT: OnceLock<()> = OnceLock::new();
static RECENT_ERRORS: Mutex<VecDeque<String>> = Mutex::new(VecDeque::new());

/// Explicitly set diagnostics enabled state. Call early in main().
/// If not called, falls back to checking REHBER_DIAG env var.
pub fn set_enabled(enabled: bool) {
    DIAG_ENABLED.store(enabled, Ordering::Relaxed);
    let _ = DIAG_ENABLED_INIT.set(());
}

fn diagnostics_enabled() -> bool {
    if DIAG_ENABLED_INIT.get().is_some() {
        return DIAG_ENABLED.load(Ordering::Relaxed);
    }

    let env_enabled = std::env::var(DIAG_ENV)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);
    if env_enabled {
        DIAG_ENABLED.store(true, Ordering::Relaxed);
    }
    let _ = DIAG_ENABLED_INIT.set(());
    env_enabled
}

fn diagnostics_path() -> Option<PathBuf> {
    static PATH: OnceLock<Option<PathBuf>> = OnceLock::new();
    PATH.get_or_init(|| {
        let home = dirs::home_dir()?;
        Some(home.join(".rehber").join("logs").join("diagnostics.log"))
    })
    .clone()
}

pub fn log_dir() -> Option<PathBuf> {
    static DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
    DIR.get_or_init(|| {
        let home = dirs::home_dir()?;
        Some(home.join(".rehber").join("logs"))
    })
    .clone()
}

/// App-local data directory (favorites and friends live here).
pub fn data_dir() -> Option<PathBuf> {
    static DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
    DIR.get_or_init(|| {
        let home = dirs::home_dir()?;
        Some(home.join(".rehber"))
    })
    .clone()
}

fn write_line(message: &str) {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown-time".to_string());
    let line = format!("[{}] {}\n", timestamp, message);

    if let Some(path) = diagnostics_path() {
        if let Some(parent) = path.parent() {
            let _ = create_dir_all(parent);
        }
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = file.write_all(line.as_bytes());
        }
    }

    eprintln!("[diag] {}", message);
}

pub fn log(message: impl AsRef<str>) {
    if !diagnostics_enabled() {
        return;
    }
    write_line(message.as_ref());
}

/// Errors are recorded regardless of the diagnostics gate and kept in a
/// small in-memory ring so the UI can surface the most recent failures.
pub fn error(message: impl AsRef<str>) {
    let message = message.as_ref();
    if let Ok(mut ring) = RECENT_ERRORS.lock() {
        if ring.len() == RECENT_ERRORS_CAP {
            ring.pop_front();
        }
        ring.push_back(message.to_string());
    }
    write_line(message);
}

pub fn recent_errors() -> Vec<String> {
    RECENT_ERRORS
        .lock()
        .map(|ring| ring.iter().cloned().collect())
        .unwrap_or_default()
}
