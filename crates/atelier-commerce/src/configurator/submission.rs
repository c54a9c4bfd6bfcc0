//! Submission payload handed to checkout, and server-side re-pricing.

use crate::catalog::{CatalogSnapshot, OptionItem, Step};
use crate::error::CommerceError;
use crate::i18n::Locale;
use crate::ids::{AddonId, FunctionId, OptionId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::pricing::{price_selection, resolved_options, LineSource, PricedConfiguration};
use super::SelectionState;

/// A finalized configuration as sent to the checkout endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// Function id followed by the chosen option ids in step order.
    /// Unselected optional steps are omitted.
    pub steps: Vec<String>,
    #[serde(default)]
    pub addons: Vec<AddonId>,
    /// Client-computed total in whole currency units.
    pub price: f64,
}

impl SubmissionPayload {
    /// Serialize a priced configuration.
    pub fn from_priced(priced: &PricedConfiguration) -> Self {
        let mut steps = Vec::with_capacity(priced.line_items.len() + 1);
        if let Some(function) = &priced.function {
            steps.push(function.to_string());
        }
        let mut addons = Vec::new();
        for item in &priced.line_items {
            match &item.source {
                LineSource::Option(id) => steps.push(id.to_string()),
                LineSource::Addon(id) => addons.push(id.clone()),
                LineSource::Function(_) => {}
            }
        }
        Self {
            steps,
            addons,
            price: priced.total.to_decimal(),
        }
    }

    /// Rebuild a selection from ids alone.
    ///
    /// Every required step must be covered, ids must appear in sequence
    /// order, and every add-on must be offered for the resulting selection.
    pub fn to_state(&self, catalog: &CatalogSnapshot) -> Result<SelectionState, CommerceError> {
        let (function_id, option_ids) = self
            .steps
            .split_first()
            .ok_or_else(|| CommerceError::ConfigurationIncomplete("function".to_string()))?;

        let function = FunctionId::new(function_id.as_str());
        if catalog.function(&function).is_none() {
            return Err(CommerceError::OptionNotAvailable {
                step: "function".to_string(),
                option: function_id.clone(),
            });
        }

        let sequence = catalog.steps_for_function(&function);
        let mismatch = (sequence.len() + 1, self.steps.len());
        let mut state = SelectionState::new();
        for option in assign_steps(catalog, &function, &sequence, option_ids, mismatch)? {
            state.selections.insert(option.step, option.id.clone());
        }

        state.function = Some(function);
        let resolved = resolved_options(catalog, &state);
        for id in &self.addons {
            let addon = catalog
                .addon(id)
                .ok_or_else(|| CommerceError::UnknownAddon(id.to_string()))?;
            let selected = resolved
                .iter()
                .find(|option| option.step == addon.step)
                .map(|option| &option.id);
            if !addon.is_eligible_for(selected) {
                return Err(CommerceError::AddonNotEligible(id.to_string()));
            }
            state.addons.insert(id.clone(), true);
        }

        state.cursor = sequence.len();
        Ok(state)
    }
}

/// Match option ids to steps in sequence order.
///
/// An optional step that accepts the next id is skipped instead when taking
/// the id leaves a later step unmatched. The error reported is the one from
/// taking it.
fn assign_steps<'c>(
    catalog: &'c CatalogSnapshot,
    function: &FunctionId,
    steps: &[&Step],
    ids: &[String],
    mismatch: (usize, usize),
) -> Result<Vec<&'c OptionItem>, CommerceError> {
    let Some((step, rest)) = steps.split_first() else {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        return Err(CommerceError::SequenceMismatch {
            expected: mismatch.0,
            got: mismatch.1,
        });
    };

    let matched = ids.first().and_then(|id| {
        catalog.resolve_option(step.key, Some(function), &OptionId::new(id.as_str()))
    });
    let Some(option) = matched else {
        if step.optional {
            return assign_steps(catalog, function, rest, ids, mismatch);
        }
        return Err(CommerceError::ConfigurationIncomplete(step.key.to_string()));
    };

    let taken = assign_steps(catalog, function, rest, &ids[1..], mismatch).map(|mut options| {
        options.insert(0, option);
        options
    });
    if taken.is_err() && step.optional {
        if let Ok(skipped) = assign_steps(catalog, function, rest, ids, mismatch) {
            return Ok(skipped);
        }
    }
    taken
}

/// Recompute line items and total from a submitted payload.
///
/// The client price is never trusted: a payload whose price differs from
/// the recomputed total is rejected.
pub fn reprice(
    catalog: &CatalogSnapshot,
    payload: &SubmissionPayload,
    locale: Locale,
) -> Result<PricedConfiguration, CommerceError> {
    let state = payload.to_state(catalog)?;
    let priced = price_selection(catalog, &state, locale)?;

    let submitted = Money::from_decimal(payload.price, catalog.currency);
    if submitted != priced.total {
        warn!(
            submitted = %submitted,
            computed = %priced.total,
            "rejecting configuration with tampered price"
        );
        return Err(CommerceError::PriceMismatch {
            submitted: submitted.display(),
            computed: priced.total.display(),
        });
    }

    Ok(priced)
}
