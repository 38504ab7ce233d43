//! Configuration type definitions
//!
//! This module contains all the struct definitions for the settings file.

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::hotkeys::DispatchPolicy;

// ============================================
// HOTKEY SETTINGS
// ============================================

/// Raw, user-editable combos for the three global bindings.
///
/// Values are stored as typed by the user; normalization happens at
/// validation and registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeySettings {
    #[serde(default = "default_record_toggle")]
    pub record_toggle: String,
    #[serde(default = "default_paste_last")]
    pub paste_last: String,
    #[serde(default = "default_open_app")]
    pub open_app: String,
}

fn default_record_toggle() -> String {
    DEFAULT_RECORD_TOGGLE.to_string()
}
fn default_paste_last() -> String {
    DEFAULT_PASTE_LAST.to_string()
}
fn default_open_app() -> String {
    DEFAULT_OPEN_APP.to_string()
}

impl Default for HotkeySettings {
    fn default() -> Self {
        HotkeySettings {
            record_toggle: default_record_toggle(),
            paste_last: default_paste_last(),
            open_app: default_open_app(),
        }
    }
}

// ============================================
// DISPATCH CONFIG
// ============================================

/// How presses are handed to the application handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// What happens to presses that arrive while a handler is running (default: serial)
    #[serde(default)]
    pub policy: DispatchPolicy,
    /// Presses buffered per binding before new ones are dropped (default: 10)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            policy: DispatchPolicy::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

// ============================================
// MAIN SETTINGS
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hotkeys: HotkeySettings,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}
