//! The OS-level global shortcut service, as seen by the registrar.
//!
//! The registrar never talks to the operating system directly; it drives a
//! [`ShortcutHost`]. Production code uses [`super::GlobalHotkeyHost`], tests
//! substitute an in-memory fake.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Transition reported by the host for a registered combo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShortcutState {
    Pressed,
    Released,
}

impl fmt::Display for ShortcutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pressed => f.write_str("Pressed"),
            Self::Released => f.write_str("Released"),
        }
    }
}

/// A key transition delivered by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutEvent {
    /// The combo as it was passed to [`ShortcutHost::register`].
    pub combo: String,
    pub state: ShortcutState,
}

impl ShortcutEvent {
    pub fn new(combo: impl Into<String>, state: ShortcutState) -> Self {
        Self {
            combo: combo.into(),
            state,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.state == ShortcutState::Pressed
    }
}

/// Invoked by the host for every transition of a registered combo.
///
/// Called from whatever thread the host delivers events on, so it must not
/// block.
pub type ShortcutCallback = Arc<dyn Fn(ShortcutEvent) + Send + Sync>;

/// Failures reported by the host service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Invalid hotkey '{combo}': {message}")]
    InvalidCombo { combo: String, message: String },

    #[error("Hotkey '{0}' is already registered by another application or script.")]
    AlreadyRegistered(String),

    #[error("System rejected hotkey '{combo}': {message}")]
    Rejected { combo: String, message: String },

    #[error("OS error for hotkey '{combo}': {message}")]
    Os { combo: String, message: String },

    #[error("Global shortcut service unavailable: {0}")]
    Unavailable(String),
}

/// Global shortcut registry owned by the host environment.
///
/// The registry is process-wide: `unregister_all` clears every shortcut the
/// host knows about, not only those registered through one caller.
#[async_trait]
pub trait ShortcutHost: Send + Sync {
    /// Install a global shortcut for `combo`, delivering its events to `callback`.
    async fn register(&self, combo: &str, callback: ShortcutCallback) -> Result<(), HostError>;

    /// Remove every registered global shortcut.
    async fn unregister_all(&self) -> Result<(), HostError>;
}
