//! Price and line-item derivation for a selection.
//!
//! Everything here is a pure projection of a `SelectionState` against a
//! `CatalogSnapshot`. Nothing is cached.

use crate::catalog::{Addon, CatalogSnapshot, OptionItem, StepKey, WatchFunction};
use crate::error::CommerceError;
use crate::i18n::Locale;
use crate::ids::{AddonId, FunctionId, OptionId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

use super::SelectionState;

/// What a line item was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum LineSource {
    Function(FunctionId),
    Option(OptionId),
    Addon(AddonId),
}

/// A labeled price row for the summary panel and cart toast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigLineItem {
    pub step: StepKey,
    pub source: LineSource,
    pub label: String,
    pub price: Money,
}

/// Line items and total for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedConfiguration {
    pub function: Option<FunctionId>,
    pub line_items: Vec<ConfigLineItem>,
    pub total: Money,
}

impl PricedConfiguration {
    /// Label of the option chosen for a step, if any.
    pub fn label_for(&self, step: StepKey) -> Option<&str> {
        self.line_items
            .iter()
            .find(|item| item.step == step && matches!(item.source, LineSource::Option(_)))
            .map(|item| item.label.as_str())
    }
}

/// The selected function, if it exists in the catalog.
pub(crate) fn selected_function<'c>(
    catalog: &'c CatalogSnapshot,
    state: &SelectionState,
) -> Option<&'c WatchFunction> {
    state.function.as_ref().and_then(|id| catalog.function(id))
}

/// Selected options in sequence order, resolved against the function scope.
///
/// Selections for steps outside the active sequence, or options not visible
/// for the selected function, are skipped.
pub(crate) fn resolved_options<'c>(
    catalog: &'c CatalogSnapshot,
    state: &SelectionState,
) -> Vec<&'c OptionItem> {
    let Some(function) = state.function.as_ref() else {
        return Vec::new();
    };
    catalog
        .steps_for_function(function)
        .into_iter()
        .filter_map(|step| {
            state
                .selection(step.key)
                .and_then(|id| catalog.resolve_option(step.key, Some(function), id))
        })
        .collect()
}

/// Checked add-ons that are offered for the current selection.
pub(crate) fn eligible_checked_addons<'c>(
    catalog: &'c CatalogSnapshot,
    state: &SelectionState,
    resolved: &[&OptionItem],
) -> Vec<&'c Addon> {
    catalog
        .addons
        .iter()
        .filter(|addon| state.is_addon_checked(&addon.id))
        .filter(|addon| {
            let selected = resolved
                .iter()
                .find(|option| option.step == addon.step)
                .map(|option| &option.id);
            addon.is_eligible_for(selected)
        })
        .collect()
}

/// Derive line items and the total for a selection.
///
/// The function only yields a line item when it carries a non-zero price.
pub fn price_selection(
    catalog: &CatalogSnapshot,
    state: &SelectionState,
    locale: Locale,
) -> Result<PricedConfiguration, CommerceError> {
    let mut line_items = Vec::new();

    if let Some(function) = selected_function(catalog, state) {
        if function.price_cents != 0 {
            line_items.push(ConfigLineItem {
                step: StepKey::Function,
                source: LineSource::Function(function.id.clone()),
                label: format!(
                    "{}: {}",
                    catalog.step_label(StepKey::Function).get(locale),
                    function.label.get(locale)
                ),
                price: catalog.money(function.price_cents),
            });
        }
    }

    let resolved = resolved_options(catalog, state);
    for option in &resolved {
        line_items.push(ConfigLineItem {
            step: option.step,
            source: LineSource::Option(option.id.clone()),
            label: format!(
                "{}: {}",
                catalog.step_label(option.step).get(locale),
                option.label.get(locale)
            ),
            price: catalog.money(option.price_cents),
        });
    }

    for addon in eligible_checked_addons(catalog, state, &resolved) {
        line_items.push(ConfigLineItem {
            step: addon.step,
            source: LineSource::Addon(addon.id.clone()),
            label: addon.label.get(locale).to_string(),
            price: catalog.money(addon.price_cents),
        });
    }

    let total = Money::try_sum(line_items.iter().map(|item| &item.price), catalog.currency)
        .ok_or(CommerceError::Overflow)?;

    Ok(PricedConfiguration {
        function: state.function.clone(),
        line_items,
        total,
    })
}
