//! Settings file and app directories under the per-user cache dir.
//!
//! - macOS: ~/Library/Caches/.promptbench
//! - Linux: $XDG_CACHE_HOME/.promptbench or ~/.cache/.promptbench
//! - Windows: %LOCALAPPDATA%\.promptbench

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::kernel::services::ports::settings::Settings;

const APP_DIR: &str = ".promptbench";
const SETTINGS_FILE: &str = "settings.json";
const LOG_DIR: &str = "logs";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot determine the cache directory")]
    NoCacheDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn get_app_dir() -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(APP_DIR))
}

pub fn get_settings_path() -> Option<PathBuf> {
    get_app_dir().map(|dir| dir.join(SETTINGS_FILE))
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_app_dir().map(|dir| dir.join(LOG_DIR))
}

pub fn ensure_log_dir() -> Result<PathBuf, SettingsError> {
    let dir = get_log_dir().ok_or(SettingsError::NoCacheDir)?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Creates the settings file with defaults if it does not exist yet.
pub fn ensure_settings_file() -> Result<PathBuf, SettingsError> {
    let path = get_settings_path().ok_or(SettingsError::NoCacheDir)?;
    ensure_settings_at(&path)?;
    Ok(path)
}

pub fn ensure_settings_at(path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&Settings::default())?;
        std::fs::write(path, content)?;
    }
    Ok(())
}

pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Settings from the default location, falling back to defaults when absent or unreadable.
pub fn load_settings() -> Settings {
    let Some(path) = get_settings_path() else {
        return Settings::default();
    };
    if !path.exists() {
        return Settings::default();
    }
    match load_settings_from(&path) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings");
            Settings::default()
        }
    }
}

fn get_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Caches"));
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".cache"));
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            return Some(PathBuf::from(local));
        }
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
