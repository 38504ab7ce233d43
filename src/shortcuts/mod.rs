//! Hotkey combo normalization and validation.
//!
//! This module provides:
//! - `normalize` - canonical string form of a user-typed combo
//! - `has_non_modifier` - whether a combo has an action key
//! - `validate` - completeness and duplicate checks over the three bindings
//!
//! # Example
//!
//! ```
//! use whispr_hotkeys::config::HotkeySettings;
//! use whispr_hotkeys::shortcuts::{normalize, validate};
//!
//! assert_eq!(normalize("ctrl+shift+r").as_str(), "CmdOrCtrl+shift+r");
//!
//! let settings = HotkeySettings {
//!     record_toggle: "Ctrl+R".into(),
//!     paste_last: "Control+R".into(),
//!     open_app: "Alt+O".into(),
//! };
//! let err = validate(&settings).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Duplicate hotkeys detected (CmdOrCtrl+R): Record toggle and Paste last."
//! );
//! ```

mod binding;
mod normalize;
mod validation;

pub use binding::{normalized_bindings, Binding, BindingKind};
pub use normalize::{
    classify, has_non_modifier, normalize, tokens, NormalizedCombo, TokenKind, ACCELERATOR,
    MODIFIER_KEYS,
};
pub use validation::{validate, ValidationError};
