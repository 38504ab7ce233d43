//! Configuration module - hotkey settings and dispatch options
//!
//! This module provides functionality for:
//! - Loading settings from ~/.whispr/settings.json
//! - Default values for all settings
//! - Type definitions for settings structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Settings struct definitions (Settings, HotkeySettings, DispatchConfig)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_OPEN_APP, DEFAULT_PASTE_LAST, DEFAULT_QUEUE_CAPACITY, DEFAULT_RECORD_TOGGLE,
    DEFAULT_SETTINGS_PATH,
};

pub use types::{DispatchConfig, HotkeySettings, Settings};

pub use loader::{default_settings_path, load_settings, try_load_settings, ConfigError};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
