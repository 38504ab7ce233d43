//! The three global bindings the application owns.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::normalize::{normalize, NormalizedCombo};
use crate::config::HotkeySettings;

/// A named hotkey role.
///
/// Order matters: validation, registration and error messages always walk
/// [`BindingKind::ALL`] front to back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    RecordToggle,
    PasteLast,
    OpenApp,
}

impl BindingKind {
    pub const ALL: [BindingKind; 3] = [
        BindingKind::RecordToggle,
        BindingKind::PasteLast,
        BindingKind::OpenApp,
    ];

    /// Human-readable label used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::RecordToggle => "Record toggle",
            Self::PasteLast => "Paste last",
            Self::OpenApp => "Open app",
        }
    }

    /// Settings key of this binding.
    pub fn key(self) -> &'static str {
        match self {
            Self::RecordToggle => "record_toggle",
            Self::PasteLast => "paste_last",
            Self::OpenApp => "open_app",
        }
    }

    /// The raw, user-typed combo for this binding.
    pub fn raw(self, settings: &HotkeySettings) -> &str {
        match self {
            Self::RecordToggle => &settings.record_toggle,
            Self::PasteLast => &settings.paste_last,
            Self::OpenApp => &settings.open_app,
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A binding role paired with its normalized combo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub kind: BindingKind,
    pub combo: NormalizedCombo,
}

impl Binding {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// Normalize all three bindings, in binding order.
pub fn normalized_bindings(settings: &HotkeySettings) -> [Binding; 3] {
    BindingKind::ALL.map(|kind| Binding {
        kind,
        combo: normalize(kind.raw(settings)),
    })
}
