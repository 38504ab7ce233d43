//! Whispr Hotkeys - global hotkey bindings for the Whispr dictation app
//!
//! Normalizes and validates the three user-configurable bindings
//! (record toggle, paste last, open app) and registers them with the
//! operating system's global shortcut service.

pub mod config;
pub mod error;
pub mod hotkeys;
pub mod logging;
pub mod session;
pub mod shortcuts;
