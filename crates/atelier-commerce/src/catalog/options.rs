//! Configurator catalog: functions, steps, options and add-ons.

use std::collections::HashSet;

use crate::error::CommerceError;
use crate::i18n::LocalizedText;
use crate::ids::{AddonId, FunctionId, OptionId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Key of a configuration step.
///
/// The declaration order is the default back-to-front preview order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StepKey {
    Function,
    Size,
    Case,
    Dial,
    Hands,
    Strap,
    Extra,
}

impl StepKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKey::Function => "function",
            StepKey::Size => "size",
            StepKey::Case => "case",
            StepKey::Dial => "dial",
            StepKey::Hands => "hands",
            StepKey::Strap => "strap",
            StepKey::Extra => "extra",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "function" => Some(StepKey::Function),
            "size" => Some(StepKey::Size),
            "case" => Some(StepKey::Case),
            "dial" => Some(StepKey::Dial),
            "hands" => Some(StepKey::Hands),
            "strap" => Some(StepKey::Strap),
            "extra" => Some(StepKey::Extra),
            _ => None,
        }
    }

    /// Preview z-index used when an option carries no explicit positive z-index.
    pub fn default_z_index(&self) -> i32 {
        match self {
            StepKey::Function => 0,
            StepKey::Size => 5,
            StepKey::Case => 10,
            StepKey::Dial => 20,
            StepKey::Hands => 30,
            StepKey::Strap => 40,
            StepKey::Extra => 50,
        }
    }

    /// Label used when the catalog does not provide one.
    pub fn default_label(&self) -> LocalizedText {
        match self {
            StepKey::Function => LocalizedText::new("Function", "Fonction"),
            StepKey::Size => LocalizedText::new("Size", "Taille"),
            StepKey::Case => LocalizedText::new("Case", "Boîtier"),
            StepKey::Dial => LocalizedText::new("Dial", "Cadran"),
            StepKey::Hands => LocalizedText::new("Hands", "Aiguilles"),
            StepKey::Strap => LocalizedText::new("Strap", "Bracelet"),
            StepKey::Extra => LocalizedText::new("Extra", "Extra"),
        }
    }
}

impl std::fmt::Display for StepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A watch family, chosen first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchFunction {
    pub id: FunctionId,
    pub label: LocalizedText,
    /// Single-letter glyph shown on the option tile.
    pub letter: String,
    /// Price delta in minor units. Zero in shipped data.
    #[serde(default)]
    pub price_cents: i64,
    /// Preview image drawn beneath every other layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerImage>,
    /// Overlay drawn on top of the preview when this function has an extra
    /// step. Also stands in for extra options that carry no image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_overlay: Option<String>,
}

impl WatchFunction {
    pub fn new(
        id: impl Into<FunctionId>,
        label: LocalizedText,
        letter: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label,
            letter: letter.into(),
            price_cents: 0,
            layer: None,
            extra_overlay: None,
        }
    }
}

/// A configuration stage after the function step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub key: StepKey,
    pub label: LocalizedText,
    #[serde(default)]
    pub optional: bool,
    /// Sort position within a function's sequence.
    #[serde(default)]
    pub position: u32,
    /// Functions this step applies to; `None` means all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionId>>,
}

impl Step {
    /// Check if the step is part of the given function's sequence.
    pub fn applies_to(&self, function: &FunctionId) -> bool {
        match &self.functions {
            Some(ids) => ids.contains(function),
            None => true,
        }
    }
}

/// Image layer metadata for the live preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LayerImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
    /// Explicit z-index; values <= 0 fall back to the step default.
    #[serde(default)]
    pub z_index: i32,
}

impl LayerImage {
    pub fn layer(url: impl Into<String>) -> Self {
        Self {
            layer_image_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// First non-empty URL in layer, image, preview order.
    pub fn resolved_url(&self) -> Option<&str> {
        [
            &self.layer_image_url,
            &self.image_url,
            &self.preview_image_url,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|url| !url.is_empty())
    }
}

/// A selectable value within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: OptionId,
    pub step: StepKey,
    pub label: LocalizedText,
    pub letter: String,
    pub price_cents: i64,
    /// Restricts the option to a single function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_option_id: Option<FunctionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerImage>,
}

impl OptionItem {
    pub fn new(
        id: impl Into<OptionId>,
        step: StepKey,
        label: LocalizedText,
        letter: impl Into<String>,
        price_cents: i64,
    ) -> Self {
        Self {
            id: id.into(),
            step,
            label,
            letter: letter.into(),
            price_cents,
            parent_option_id: None,
            layer: None,
        }
    }

    /// Scope the option to one function.
    pub fn for_function(mut self, function: impl Into<FunctionId>) -> Self {
        self.parent_option_id = Some(function.into());
        self
    }

    pub fn with_layer(mut self, layer: LayerImage) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Visible when unscoped or scoped to the selected function.
    pub fn is_visible_for(&self, function: Option<&FunctionId>) -> bool {
        match &self.parent_option_id {
            None => true,
            Some(parent) => function == Some(parent),
        }
    }
}

/// An optional extra offered alongside specific options of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub id: AddonId,
    pub step: StepKey,
    /// Options of `step` this add-on is offered with.
    pub option_ids: Vec<OptionId>,
    pub label: LocalizedText,
    pub price_cents: i64,
}

impl Addon {
    /// Check if the add-on is offered for the given step selection.
    pub fn is_eligible_for(&self, selected: Option<&OptionId>) -> bool {
        selected.map_or(false, |id| self.option_ids.contains(id))
    }
}

/// Read-only catalog snapshot fetched once per configurator session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub functions: Vec<WatchFunction>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub options: Vec<OptionItem>,
    #[serde(default)]
    pub addons: Vec<Addon>,
}

impl CatalogSnapshot {
    /// Parse a snapshot from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, CommerceError> {
        let catalog: CatalogSnapshot = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// No functions means the configurator has nothing to offer.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Convert a minor-unit price to money in the catalog currency.
    pub fn money(&self, price_cents: i64) -> Money {
        Money::new(price_cents, self.currency)
    }

    pub fn function(&self, id: &FunctionId) -> Option<&WatchFunction> {
        self.functions.iter().find(|f| &f.id == id)
    }

    pub fn step(&self, key: StepKey) -> Option<&Step> {
        self.steps.iter().find(|s| s.key == key)
    }

    /// Label for a step, falling back to the built-in one.
    pub fn step_label(&self, key: StepKey) -> LocalizedText {
        self.step(key)
            .map(|s| s.label.clone())
            .unwrap_or_else(|| key.default_label())
    }

    /// Steps applicable to a function, in position order.
    ///
    /// Unknown functions get an empty sequence.
    pub fn steps_for_function(&self, function: &FunctionId) -> Vec<&Step> {
        if self.function(function).is_none() {
            return Vec::new();
        }
        let mut steps: Vec<&Step> = self
            .steps
            .iter()
            .filter(|s| s.key != StepKey::Function && s.applies_to(function))
            .collect();
        steps.sort_by_key(|s| s.position);
        steps
    }

    /// Options visible for a step under the selected function.
    pub fn visible_options(
        &self,
        step: StepKey,
        function: Option<&FunctionId>,
    ) -> Vec<&OptionItem> {
        self.options
            .iter()
            .filter(|o| o.step == step && o.is_visible_for(function))
            .collect()
    }

    /// Resolve an option id against a step and the selected function.
    pub fn resolve_option(
        &self,
        step: StepKey,
        function: Option<&FunctionId>,
        id: &OptionId,
    ) -> Option<&OptionItem> {
        self.options
            .iter()
            .find(|o| o.step == step && &o.id == id && o.is_visible_for(function))
    }

    pub fn addon(&self, id: &AddonId) -> Option<&Addon> {
        self.addons.iter().find(|a| &a.id == id)
    }

    pub fn addons_for_step(&self, step: StepKey) -> Vec<&Addon> {
        self.addons.iter().filter(|a| a.step == step).collect()
    }

    /// Check structural consistency of the snapshot.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let mut function_ids = HashSet::new();
        for function in &self.functions {
            if !function_ids.insert(&function.id) {
                return Err(CommerceError::InvalidCatalog(format!(
                    "duplicate function {}",
                    function.id
                )));
            }
        }

        let mut step_keys = HashSet::new();
        for step in &self.steps {
            if step.key == StepKey::Function {
                return Err(CommerceError::InvalidCatalog(
                    "the function step is implicit and must not be listed".to_string(),
                ));
            }
            if !step_keys.insert(step.key) {
                return Err(CommerceError::InvalidCatalog(format!(
                    "duplicate step {}",
                    step.key
                )));
            }
            for id in step.functions.iter().flatten() {
                if !function_ids.contains(id) {
                    return Err(CommerceError::InvalidCatalog(format!(
                        "step {} references unknown function {}",
                        step.key, id
                    )));
                }
            }
        }

        let mut option_keys = HashSet::new();
        for option in &self.options {
            if option.step == StepKey::Function {
                return Err(CommerceError::InvalidCatalog(format!(
                    "option {} targets the function step",
                    option.id
                )));
            }
            if !step_keys.contains(&option.step) {
                return Err(CommerceError::InvalidCatalog(format!(
                    "option {} belongs to unknown step {}",
                    option.id, option.step
                )));
            }
            if let Some(parent) = &option.parent_option_id {
                if !function_ids.contains(parent) {
                    return Err(CommerceError::InvalidCatalog(format!(
                        "option {} is scoped to unknown function {}",
                        option.id, parent
                    )));
                }
            }
            if !option_keys.insert((option.step, &option.id)) {
                return Err(CommerceError::InvalidCatalog(format!(
                    "duplicate option {} in step {}",
                    option.id, option.step
                )));
            }
        }

        let mut addon_ids = HashSet::new();
        for addon in &self.addons {
            if !addon_ids.insert(&addon.id) {
                return Err(CommerceError::InvalidCatalog(format!(
                    "duplicate add-on {}",
                    addon.id
                )));
            }
            for id in &addon.option_ids {
                if !option_keys.contains(&(addon.step, id)) {
                    return Err(CommerceError::InvalidCatalog(format!(
                        "add-on {} references unknown {} option {}",
                        addon.id, addon.step, id
                    )));
                }
            }
        }

        Ok(())
    }
}
