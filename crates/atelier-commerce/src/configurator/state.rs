//! Per-session selection state.

use std::collections::BTreeMap;

use crate::catalog::StepKey;
use crate::ids::{AddonId, FunctionId, OptionId};
use serde::{Deserialize, Serialize};

/// What the customer has picked so far.
///
/// Owned exclusively by one configurator session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    /// Selected watch family.
    pub function: Option<FunctionId>,
    /// Chosen option per step (never contains `StepKey::Function`).
    #[serde(default)]
    pub selections: BTreeMap<StepKey, OptionId>,
    /// Add-on checkboxes.
    #[serde(default)]
    pub addons: BTreeMap<AddonId, bool>,
    /// Index into the active step sequence.
    #[serde(default)]
    pub cursor: usize,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every selection and return to the first step.
    pub fn clear(&mut self) {
        self.function = None;
        self.selections.clear();
        self.addons.clear();
        self.cursor = 0;
    }

    pub fn selection(&self, step: StepKey) -> Option<&OptionId> {
        self.selections.get(&step)
    }

    pub fn is_addon_checked(&self, id: &AddonId) -> bool {
        self.addons.get(id).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_everything() {
        let mut state = SelectionState::new();
        state.function = Some(FunctionId::new("oak"));
        state.selections.insert(StepKey::Case, OptionId::new("black"));
        state.addons.insert(AddonId::new("frosted-finish"), true);
        state.cursor = 3;

        state.clear();
        assert_eq!(state, SelectionState::default());
    }

    #[test]
    fn test_state_serializes_step_keys_as_strings() {
        let mut state = SelectionState::new();
        state.selections.insert(StepKey::Dial, OptionId::new("onyx-black"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["selections"]["dial"], "onyx-black");
    }
}
