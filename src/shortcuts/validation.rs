//! Completeness and conflict checks for the hotkey settings.
//!
//! Validation is fail-fast: the first problem found is the only one reported.
//! Per-binding checks run in binding order before duplicate detection, so a
//! modifier-only combo is reported even if it also collides with another one.

use std::collections::HashMap;

use thiserror::Error;

use super::binding::{normalized_bindings, BindingKind};
use super::normalize::NormalizedCombo;
use crate::config::HotkeySettings;

/// Why a set of hotkeys cannot be registered.
///
/// `Display` yields the exact message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{} hotkey is required.", .binding.label())]
    MissingBinding { binding: BindingKind },

    #[error("{} hotkey needs a non-modifier key.", .binding.label())]
    NoActionKey { binding: BindingKind },

    #[error("Duplicate hotkeys detected ({combo}): {}.", join_labels(.bindings))]
    DuplicateBinding {
        combo: NormalizedCombo,
        bindings: Vec<BindingKind>,
    },
}

impl ValidationError {
    /// The first binding the error refers to.
    pub fn binding(&self) -> BindingKind {
        match self {
            Self::MissingBinding { binding } | Self::NoActionKey { binding } => *binding,
            Self::DuplicateBinding { bindings, .. } => bindings
                .first()
                .copied()
                .unwrap_or(BindingKind::RecordToggle),
        }
    }
}

fn join_labels(bindings: &[BindingKind]) -> String {
    bindings
        .iter()
        .map(|binding| binding.label())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Check that every binding is present, has an action key, and that no two
/// bindings share a combo.
pub fn validate(settings: &HotkeySettings) -> Result<(), ValidationError> {
    let bindings = normalized_bindings(settings);

    for binding in &bindings {
        if binding.combo.is_empty() {
            return Err(ValidationError::MissingBinding {
                binding: binding.kind,
            });
        }
        if !binding.combo.has_action_key() {
            return Err(ValidationError::NoActionKey {
                binding: binding.kind,
            });
        }
    }

    // Vec keeps first-seen order, the map only indexes into it.
    let mut groups: Vec<(&NormalizedCombo, Vec<BindingKind>)> = Vec::new();
    let mut index: HashMap<&NormalizedCombo, usize> = HashMap::new();
    for binding in &bindings {
        match index.get(&binding.combo) {
            Some(&i) => groups[i].1.push(binding.kind),
            None => {
                index.insert(&binding.combo, groups.len());
                groups.push((&binding.combo, vec![binding.kind]));
            }
        }
    }

    if let Some((combo, kinds)) = groups.into_iter().find(|(_, kinds)| kinds.len() > 1) {
        return Err(ValidationError::DuplicateBinding {
            combo: combo.clone(),
            bindings: kinds,
        });
    }

    Ok(())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
