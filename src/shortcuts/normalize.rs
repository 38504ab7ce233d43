//! Canonical form for user-typed hotkey combos.
//!
//! A combo is a `+`-joined list of tokens such as `"Ctrl+Shift+R"`. Tokens
//! are either modifiers (a fixed, case-sensitive set) or action keys
//! (anything else). Normalizing keeps token order and case, except that
//! every spelling of `ctrl`/`control` becomes the platform accelerator
//! `CmdOrCtrl`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform accelerator token that `Ctrl`/`Control` are folded into.
pub const ACCELERATOR: &str = "CmdOrCtrl";

/// Tokens that never count as an action key.
pub const MODIFIER_KEYS: &[&str] = &[
    "CmdOrCtrl",
    "CommandOrControl",
    "Cmd",
    "Ctrl",
    "Control",
    "Alt",
    "Shift",
];

/// Class of a single combo token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Modifier,
    Action,
}

/// Classify a trimmed token. Matching is exact: `"shift"` is an action token.
pub fn classify(token: &str) -> TokenKind {
    if MODIFIER_KEYS.contains(&token) {
        TokenKind::Modifier
    } else {
        TokenKind::Action
    }
}

/// Trimmed, non-empty tokens of a combo in their original order.
pub fn tokens(combo: &str) -> impl Iterator<Item = &str> {
    combo.split('+').map(str::trim).filter(|part| !part.is_empty())
}

/// True if at least one token of `combo` is not a modifier.
pub fn has_non_modifier(combo: &str) -> bool {
    tokens(combo).any(|token| classify(token) == TokenKind::Action)
}

/// Normalize a raw combo string.
///
/// ```
/// use whispr_hotkeys::shortcuts::normalize;
///
/// assert_eq!(normalize(" ctrl + Shift +R").as_str(), "CmdOrCtrl+Shift+R");
/// assert_eq!(normalize("Alt++K").as_str(), "Alt+K");
/// ```
pub fn normalize(raw: &str) -> NormalizedCombo {
    let joined = tokens(raw)
        .map(|token| {
            let lower = token.to_lowercase();
            if lower == "ctrl" || lower == "control" {
                ACCELERATOR
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join("+");

    NormalizedCombo(joined)
}

/// A combo in canonical form. Only produced by [`normalize`], so normalizing
/// its string again is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedCombo(String);

impl NormalizedCombo {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the combo carries at least one action token.
    pub fn has_action_key(&self) -> bool {
        has_non_modifier(&self.0)
    }
}

impl fmt::Display for NormalizedCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedCombo {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NormalizedCombo {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedCombo {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
