use thiserror::Error;
use tracing::warn;

use crate::hotkeys::HostError;
use crate::shortcuts::ValidationError;

/// Errors returned by hotkey registration.
///
/// Both variants are transparent: the message shown to the user is the
/// validator's message or the host's own error, never re-worded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl HotkeyError {
    /// True if the settings were rejected before the host was touched.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, HotkeyError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use whispr_hotkeys::error::ResultExt;
///
/// // Best-effort cleanup on shutdown
/// commands.try_send(command).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::BindingKind;

    #[test]
    fn validation_message_passes_through() {
        let err: HotkeyError = ValidationError::MissingBinding {
            binding: BindingKind::OpenApp,
        }
        .into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Open app hotkey is required.");
    }

    #[test]
    fn host_message_passes_through() {
        let host = HostError::AlreadyRegistered("Alt+K".to_string());
        let err: HotkeyError = host.clone().into();
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), host.to_string());
    }

    #[test]
    fn result_ext_returns_value_or_none() {
        let ok: std::result::Result<u8, String> = Ok(7);
        assert_eq!(ok.warn_on_err(), Some(7));

        let err: std::result::Result<u8, String> = Err("boom".to_string());
        assert_eq!(err.warn_on_err(), None);
    }
}
