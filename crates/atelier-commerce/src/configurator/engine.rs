//! Configurator state machine.

use crate::catalog::{Addon, CatalogSnapshot, OptionItem, StepKey, WatchFunction};
use crate::checkout::{CheckoutError, CheckoutRequest, CheckoutSubmitter};
use crate::error::CommerceError;
use crate::i18n::Locale;
use crate::ids::{AddonId, FunctionId, OptionId, UserId};
use crate::money::Money;
use tracing::{debug, info, warn};

use super::preview::{derive_layers, PreviewLayer};
use super::pricing::{price_selection, ConfigLineItem, PricedConfiguration};
use super::submission::SubmissionPayload;
use super::SelectionState;

/// Outcome of [`Configurator::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Cursor moved to the given step index.
    Moved(usize),
    /// Last step confirmed; hand the payload to checkout.
    Submit(SubmissionPayload),
    /// Current step needs a selection first.
    Blocked,
}

/// One configurator session over a catalog snapshot.
///
/// Step 0 is always the function step; the rest of the sequence comes from
/// the selected function. All operations except [`Configurator::submit`]
/// are synchronous in-memory mutations.
#[derive(Debug, Clone)]
pub struct Configurator<'c> {
    catalog: &'c CatalogSnapshot,
    state: SelectionState,
    submitting: bool,
    last_error: Option<String>,
}

impl<'c> Configurator<'c> {
    pub fn new(catalog: &'c CatalogSnapshot) -> Self {
        Self {
            catalog,
            state: SelectionState::new(),
            submitting: false,
            last_error: None,
        }
    }

    /// Re-enter a saved selection.
    ///
    /// Selections that no longer resolve against the catalog and add-ons
    /// the catalog does not know are dropped; the cursor is clamped.
    pub fn restore(catalog: &'c CatalogSnapshot, mut state: SelectionState) -> Self {
        let function = state.function.clone();
        let active: Vec<StepKey> = function
            .as_ref()
            .map(|f| catalog.steps_for_function(f).iter().map(|s| s.key).collect())
            .unwrap_or_default();

        state.selections.retain(|step, id| {
            active.contains(step) && catalog.resolve_option(*step, function.as_ref(), id).is_some()
        });
        state.addons.retain(|id, _| catalog.addon(id).is_some());
        state.cursor = state.cursor.min(active.len());

        Self {
            catalog,
            state,
            submitting: false,
            last_error: None,
        }
    }

    pub fn catalog(&self) -> &'c CatalogSnapshot {
        self.catalog
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn functions(&self) -> &'c [WatchFunction] {
        &self.catalog.functions
    }

    pub fn selected_function(&self) -> Option<&FunctionId> {
        self.state.function.as_ref()
    }

    pub fn selection(&self, step: StepKey) -> Option<&OptionId> {
        self.state.selection(step)
    }

    /// Function step followed by the selected function's steps.
    pub fn step_sequence(&self) -> Vec<StepKey> {
        let mut sequence = vec![StepKey::Function];
        if let Some(function) = &self.state.function {
            sequence.extend(self.catalog.steps_for_function(function).iter().map(|s| s.key));
        }
        sequence
    }

    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    pub fn current_step(&self) -> StepKey {
        self.step_sequence()
            .get(self.state.cursor)
            .copied()
            .unwrap_or(StepKey::Function)
    }

    pub fn is_last_step(&self) -> bool {
        self.state.cursor + 1 >= self.step_sequence().len()
    }

    /// Options the customer may pick for a step right now.
    pub fn visible_options(&self, step: StepKey) -> Vec<&'c OptionItem> {
        if step == StepKey::Function {
            return Vec::new();
        }
        self.catalog
            .visible_options(step, self.state.function.as_ref())
    }

    /// Add-ons offered for the step's current selection.
    pub fn eligible_addons(&self, step: StepKey) -> Vec<&'c Addon> {
        let selected = self.state.selection(step);
        self.catalog
            .addons_for_step(step)
            .into_iter()
            .filter(|addon| addon.is_eligible_for(selected))
            .collect()
    }

    pub fn is_addon_checked(&self, id: &AddonId) -> bool {
        self.state.is_addon_checked(id)
    }

    /// Choose the watch family and start over from step 0.
    ///
    /// Unknown ids are accepted; their step sequence is empty.
    pub fn select_function(&mut self, id: FunctionId) {
        if self.catalog.function(&id).is_none() {
            warn!(function = %id, "selected function is not in the catalog");
        }
        debug!(function = %id, "function selected");
        self.state.function = Some(id);
        self.state.selections.clear();
        self.state.addons.clear();
        self.state.cursor = 0;
    }

    /// Record or clear the option chosen for a step.
    ///
    /// `StepKey::Function` is routed to [`Configurator::select_function`],
    /// or [`Configurator::reset`] when cleared. Other steps must be part of
    /// the active sequence and the option must be visible for the function.
    pub fn set_step_selection(
        &mut self,
        step: StepKey,
        option: Option<OptionId>,
    ) -> Result<(), CommerceError> {
        if step == StepKey::Function {
            match option {
                Some(id) => self.select_function(FunctionId::new(id.into_inner())),
                None => self.reset(),
            }
            return Ok(());
        }

        if !self.step_sequence().contains(&step) {
            return Err(CommerceError::StepNotActive(step.to_string()));
        }

        match option {
            None => {
                self.state.selections.remove(&step);
                debug!(step = %step, "selection cleared");
            }
            Some(id) => {
                if self
                    .catalog
                    .resolve_option(step, self.state.function.as_ref(), &id)
                    .is_none()
                {
                    return Err(CommerceError::OptionNotAvailable {
                        step: step.to_string(),
                        option: id.to_string(),
                    });
                }
                debug!(step = %step, option = %id, "option selected");
                self.state.selections.insert(step, id);
            }
        }
        Ok(())
    }

    /// Check or uncheck an add-on.
    ///
    /// The flag is kept even while the add-on is not eligible; it only
    /// counts once its step holds one of the add-on's options.
    pub fn toggle_addon(&mut self, id: AddonId, checked: bool) {
        if self.catalog.addon(&id).is_none() {
            warn!(addon = %id, "ignoring unknown add-on");
            return;
        }
        debug!(addon = %id, checked, "add-on toggled");
        self.state.addons.insert(id, checked);
    }

    /// Whether the current step allows moving on.
    pub fn can_advance(&self) -> bool {
        match self.current_step() {
            StepKey::Function => self
                .state
                .function
                .as_ref()
                .is_some_and(|id| self.catalog.function(id).is_some()),
            key => {
                let optional = self.catalog.step(key).is_some_and(|s| s.optional);
                optional || self.state.selection(key).is_some()
            }
        }
    }

    /// Move to the next step, or produce the submission payload on the last one.
    pub fn advance(&mut self) -> Result<Advance, CommerceError> {
        if !self.can_advance() {
            return Ok(Advance::Blocked);
        }
        if self.is_last_step() {
            return Ok(Advance::Submit(self.submission_payload()?));
        }
        self.state.cursor += 1;
        debug!(cursor = self.state.cursor, step = %self.current_step(), "advanced");
        Ok(Advance::Moved(self.state.cursor))
    }

    /// Step back, stopping at the function step.
    pub fn go_back(&mut self) -> usize {
        self.state.cursor = self.state.cursor.saturating_sub(1);
        self.state.cursor
    }

    pub fn compute_total(&self) -> Result<Money, CommerceError> {
        Ok(self.priced(Locale::default())?.total)
    }

    pub fn derive_line_items(&self, locale: Locale) -> Result<Vec<ConfigLineItem>, CommerceError> {
        Ok(self.priced(locale)?.line_items)
    }

    pub fn priced(&self, locale: Locale) -> Result<PricedConfiguration, CommerceError> {
        price_selection(self.catalog, &self.state, locale)
    }

    pub fn derive_layers(&self) -> Vec<PreviewLayer> {
        derive_layers(self.catalog, &self.state)
    }

    /// Clear every selection and return to the function step.
    pub fn reset(&mut self) {
        debug!("configurator reset");
        self.state.clear();
        self.last_error = None;
    }

    pub fn submission_payload(&self) -> Result<SubmissionPayload, CommerceError> {
        Ok(SubmissionPayload::from_priced(&self.priced(Locale::default())?))
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Message of the last failed submission, as the checkout returned it.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Drop a busy flag left behind by an abandoned submission.
    pub fn abandon_submission(&mut self) {
        self.submitting = false;
    }

    /// Send the configuration to checkout and return the redirect URL.
    ///
    /// Only one submission may be outstanding. On failure the message is
    /// kept in [`Configurator::last_error`] and the selection is untouched.
    pub async fn submit(
        &mut self,
        submitter: &dyn CheckoutSubmitter,
        locale: Locale,
        user_id: Option<UserId>,
    ) -> Result<String, CheckoutError> {
        if self.submitting {
            return Err(CheckoutError::Busy);
        }
        if !self.is_last_step() || !self.can_advance() {
            return Err(CheckoutError::Pricing(CommerceError::ConfigurationIncomplete(
                self.current_step().to_string(),
            )));
        }

        let payload = self.submission_payload().map_err(CheckoutError::Pricing)?;
        let request = CheckoutRequest::custom(locale, user_id, payload);

        self.submitting = true;
        self.last_error = None;
        let result = submitter.submit(request).await;
        self.submitting = false;

        match result {
            Ok(url) => {
                info!(url = %url, "checkout session created");
                Ok(url)
            }
            Err(err) => {
                warn!(error = %err, "checkout submission failed");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_catalog, LayerImage};

    fn select(configurator: &mut Configurator<'_>, step: StepKey, id: &str) {
        configurator
            .set_step_selection(step, Some(OptionId::new(id)))
            .unwrap();
    }

    fn oak_complete(configurator: &mut Configurator<'_>) {
        configurator.select_function(FunctionId::new("oak"));
        select(configurator, StepKey::Case, "black");
        select(configurator, StepKey::Dial, "onyx-black");
        select(configurator, StepKey::Hands, "sword-black");
        select(configurator, StepKey::Strap, "rubber-sport");
    }

    #[test]
    fn test_function_change_clears_line_items() {
        let catalog = default_catalog();
        for function in &catalog.functions {
            let mut configurator = Configurator::new(&catalog);
            oak_complete(&mut configurator);
            configurator.toggle_addon(AddonId::new("frosted-finish"), true);

            configurator.select_function(function.id.clone());
            assert!(configurator.derive_line_items(Locale::En).unwrap().is_empty());
            assert_eq!(configurator.cursor(), 0);
            assert!(!configurator.is_addon_checked(&AddonId::new("frosted-finish")));
        }
    }

    #[test]
    fn test_oak_total_with_extra_unselected() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        oak_complete(&mut configurator);

        for _ in 0..5 {
            assert!(matches!(configurator.advance().unwrap(), Advance::Moved(_)));
        }
        assert_eq!(configurator.current_step(), StepKey::Extra);
        assert!(configurator.is_last_step());
        assert!(configurator.can_advance());
        assert_eq!(configurator.compute_total().unwrap().amount_cents, 123_000);
    }

    #[test]
    fn test_can_advance_tracks_selection() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        assert!(!configurator.can_advance());
        assert_eq!(configurator.advance().unwrap(), Advance::Blocked);

        configurator.select_function(FunctionId::new("naut"));
        assert!(configurator.can_advance());
        assert_eq!(configurator.advance().unwrap(), Advance::Moved(1));
        assert_eq!(configurator.current_step(), StepKey::Case);
        assert!(!configurator.can_advance());

        select(&mut configurator, StepKey::Case, "rose-gold");
        assert!(configurator.can_advance());

        configurator.set_step_selection(StepKey::Case, None).unwrap();
        assert!(!configurator.can_advance());
        assert_eq!(configurator.advance().unwrap(), Advance::Blocked);
        assert_eq!(configurator.cursor(), 1);
    }

    #[test]
    fn test_skeleton_case_requires_reselection() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        configurator.select_function(FunctionId::new("skeleton"));
        select(&mut configurator, StepKey::Case, "exhibition-back");
        assert_eq!(configurator.compute_total().unwrap().amount_cents, 40_000);

        configurator.select_function(FunctionId::new("oak"));
        assert_eq!(configurator.selection(StepKey::Case), None);
        assert_eq!(
            configurator.set_step_selection(StepKey::Case, Some(OptionId::new("exhibition-back"))),
            Err(CommerceError::OptionNotAvailable {
                step: "case".to_string(),
                option: "exhibition-back".to_string(),
            })
        );
        assert!(configurator
            .visible_options(StepKey::Case)
            .iter()
            .all(|o| o.id.as_str() != "exhibition-back"));

        configurator.select_function(FunctionId::new("skeleton"));
        assert_eq!(configurator.selection(StepKey::Case), None);
        assert!(configurator.compute_total().unwrap().is_zero());
    }

    #[test]
    fn test_frosted_finish_only_counts_for_scoped_cases() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        configurator.select_function(FunctionId::new("oak"));
        select(&mut configurator, StepKey::Case, "yellow-gold");
        let before = configurator.compute_total().unwrap();

        configurator.toggle_addon(AddonId::new("frosted-finish"), true);
        assert_eq!(configurator.compute_total().unwrap(), before);
        assert!(configurator.eligible_addons(StepKey::Case).is_empty());

        select(&mut configurator, StepKey::Case, "stainless-steel");
        assert_eq!(configurator.compute_total().unwrap().amount_cents, 80_000 + 20_000);
        assert_eq!(configurator.eligible_addons(StepKey::Case).len(), 1);

        configurator.toggle_addon(AddonId::new("frosted-finish"), false);
        assert_eq!(configurator.compute_total().unwrap().amount_cents, 80_000);
    }

    #[test]
    fn test_step_outside_sequence_rejected() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        configurator.select_function(FunctionId::new("oak"));
        assert_eq!(
            configurator.set_step_selection(StepKey::Size, Some(OptionId::new("41mm"))),
            Err(CommerceError::StepNotActive("size".to_string()))
        );

        configurator.select_function(FunctionId::new("day-date"));
        assert_eq!(configurator.step_sequence()[1], StepKey::Size);
        select(&mut configurator, StepKey::Size, "41mm");
        assert_eq!(configurator.compute_total().unwrap().amount_cents, 10_000);
    }

    #[test]
    fn test_function_step_selection_routes_to_select_function() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        select(&mut configurator, StepKey::Function, "gmt");
        assert_eq!(configurator.selected_function(), Some(&FunctionId::new("gmt")));

        configurator.set_step_selection(StepKey::Function, None).unwrap();
        assert_eq!(configurator.selected_function(), None);
    }

    #[test]
    fn test_unknown_function_has_only_function_step() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        configurator.select_function(FunctionId::new("sundial"));
        assert_eq!(configurator.step_sequence(), vec![StepKey::Function]);
        assert!(!configurator.can_advance());
    }

    #[test]
    fn test_empty_catalog_is_blocked() {
        let catalog = CatalogSnapshot::default();
        let mut configurator = Configurator::new(&catalog);
        assert!(catalog.is_empty());
        assert!(configurator.functions().is_empty());
        assert_eq!(configurator.advance().unwrap(), Advance::Blocked);
    }

    #[test]
    fn test_go_back_floors_at_zero() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        configurator.select_function(FunctionId::new("oak"));
        configurator.advance().unwrap();
        assert_eq!(configurator.go_back(), 0);
        assert_eq!(configurator.go_back(), 0);
    }

    #[test]
    fn test_last_step_yields_payload() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        configurator.select_function(FunctionId::new("naut"));
        select(&mut configurator, StepKey::Case, "black");
        select(&mut configurator, StepKey::Dial, "onyx-black");
        select(&mut configurator, StepKey::Hands, "sword-black");
        select(&mut configurator, StepKey::Strap, "rubber-sport");
        for _ in 0..4 {
            configurator.advance().unwrap();
        }

        match configurator.advance().unwrap() {
            Advance::Submit(payload) => {
                assert_eq!(
                    payload.steps,
                    vec!["naut", "black", "onyx-black", "sword-black", "rubber-sport"]
                );
                assert_eq!(payload.price, 1230.0);
            }
            other => panic!("expected submission, got {:?}", other),
        }
        assert_eq!(configurator.cursor(), 4);
    }

    #[test]
    fn test_restore_drops_stale_selections() {
        let catalog = default_catalog();
        let mut state = SelectionState::new();
        state.function = Some(FunctionId::new("oak"));
        state.selections.insert(StepKey::Case, OptionId::new("exhibition-back"));
        state.selections.insert(StepKey::Dial, OptionId::new("champagne"));
        state.addons.insert(AddonId::new("engraving"), true);
        state.cursor = 42;

        let configurator = Configurator::restore(&catalog, state);
        assert_eq!(configurator.selection(StepKey::Case), None);
        assert_eq!(configurator.selection(StepKey::Dial), Some(&OptionId::new("champagne")));
        assert!(configurator.state().addons.is_empty());
        assert_eq!(configurator.cursor(), 5);
        assert!(configurator.is_last_step());
    }

    #[test]
    fn test_layers_follow_selection() {
        let catalog = default_catalog();
        let mut configurator = Configurator::new(&catalog);
        configurator.select_function(FunctionId::new("skeleton"));
        select(&mut configurator, StepKey::Strap, "steel-bracelet");
        select(&mut configurator, StepKey::Case, "exhibition-back");
        select(&mut configurator, StepKey::Dial, "midnight-blue");

        let z: Vec<i32> = configurator.derive_layers().iter().map(|l| l.z_index).collect();
        assert_eq!(z, vec![12, 20, 40]);
    }

    #[test]
    fn test_function_choice_alone_has_a_layer() {
        let mut catalog = default_catalog();
        catalog.functions[0].layer = Some(LayerImage::layer("/function/oak.png"));
        let mut configurator = Configurator::new(&catalog);
        configurator.select_function(FunctionId::new("oak"));

        let layers = configurator.derive_layers();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].key, "function-oak");
        assert_eq!(layers[0].z_index, 0);
    }
}
