//! Configuration loading from file system
//!
//! Handles reading and parsing the JSON settings file.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_SETTINGS_PATH;
use super::types::Settings;

/// Error that can occur when loading settings strictly.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings from '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Default settings path (~/.whispr/settings.json), tilde expanded.
pub fn default_settings_path() -> PathBuf {
    expand_path(DEFAULT_SETTINGS_PATH)
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn resolve(path: Option<&Path>) -> PathBuf {
    match path {
        Some(path) => expand_path(&path.to_string_lossy()),
        None => default_settings_path(),
    }
}

/// Load settings, failing on a missing or malformed file.
///
/// Used where the caller has to report the problem (e.g. `whispr-hotkeys check`).
#[instrument(name = "try_load_settings", skip_all)]
pub fn try_load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = resolve(path);
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let settings =
        serde_json::from_str::<Settings>(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Load settings from `path` (or the default location).
///
/// Returns `Settings::default()` if the file is missing or cannot be parsed.
#[instrument(name = "load_settings", skip_all)]
pub fn load_settings(path: Option<&Path>) -> Settings {
    let resolved = resolve(path);

    if !resolved.exists() {
        info!(path = %resolved.display(), "Settings file not found, using defaults");
        return Settings::default();
    }

    match try_load_settings(Some(&resolved)) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "Failed to load settings, using defaults");
            Settings::default()
        }
    }
}
