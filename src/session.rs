//! Detection of the desktop session the process runs in.
//!
//! Global hotkeys need a session that lets applications grab keys
//! system-wide. Wayland compositors don't, so registration there is expected
//! to fail or silently never fire.

use std::env;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Wayland,
    X11,
    Macos,
    Windows,
    Unknown,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Wayland => "wayland",
            SessionType::X11 => "x11",
            SessionType::Macos => "macos",
            SessionType::Windows => "windows",
            SessionType::Unknown => "unknown",
        }
    }

    /// Whether global hotkeys can be registered in this session.
    pub fn hotkeys_supported(&self) -> bool {
        matches!(self, SessionType::X11 | SessionType::Macos | SessionType::Windows)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the current session from the target OS and environment.
pub fn detect_session_type() -> SessionType {
    if cfg!(target_os = "macos") {
        return SessionType::Macos;
    }
    if cfg!(target_os = "windows") {
        return SessionType::Windows;
    }
    session_type_from_env(|name| env::var(name).ok())
}

/// Linux/BSD detection: `XDG_SESSION_TYPE`, then `WAYLAND_DISPLAY`, then `DISPLAY`.
pub fn session_type_from_env<F>(var: F) -> SessionType
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = var("XDG_SESSION_TYPE") {
        match value.to_lowercase().as_str() {
            "wayland" => return SessionType::Wayland,
            "x11" => return SessionType::X11,
            _ => {}
        }
    }

    if var("WAYLAND_DISPLAY").is_some() {
        return SessionType::Wayland;
    }
    if var("DISPLAY").is_some() {
        return SessionType::X11;
    }

    SessionType::Unknown
}
