//! Layered preview derivation.

use crate::catalog::{CatalogSnapshot, LayerImage, StepKey};
use serde::{Deserialize, Serialize};

use super::pricing::{resolved_options, selected_function};
use super::SelectionState;

/// One image in the stacked watch preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewLayer {
    /// Stable key, `<step>-<option>`.
    pub key: String,
    pub step: StepKey,
    pub url: String,
    pub z_index: i32,
}

/// z-index of the extra-step overlay.
pub const EXTRA_OVERLAY_Z_INDEX: i32 = 55;

/// Layers for the function and every selected option that has an image,
/// back to front.
///
/// An explicit positive z-index wins over the step default. Ties keep
/// sequence order. A function with an extra step and an overlay image gets
/// the overlay on top once any other layer is drawn.
pub fn derive_layers(catalog: &CatalogSnapshot, state: &SelectionState) -> Vec<PreviewLayer> {
    let Some(function) = selected_function(catalog, state) else {
        return Vec::new();
    };
    let overlay = function
        .extra_overlay
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .filter(|_| {
            catalog
                .steps_for_function(&function.id)
                .iter()
                .any(|step| step.key == StepKey::Extra)
        });

    let mut layers = Vec::new();
    if let Some(image) = &function.layer {
        if let Some(url) = image.resolved_url() {
            layers.push(PreviewLayer {
                key: format!("{}-{}", StepKey::Function, function.id),
                step: StepKey::Function,
                url: url.to_string(),
                z_index: z_index_for(StepKey::Function, image.z_index),
            });
        }
    }

    for option in resolved_options(catalog, state) {
        let image = option.layer.as_ref();
        let url = image.and_then(LayerImage::resolved_url).or(match option.step {
            StepKey::Extra => overlay,
            _ => None,
        });
        let Some(url) = url else {
            continue;
        };
        layers.push(PreviewLayer {
            key: format!("{}-{}", option.step, option.id),
            step: option.step,
            url: url.to_string(),
            z_index: z_index_for(option.step, image.map_or(0, |i| i.z_index)),
        });
    }

    if let Some(url) = overlay {
        if !layers.is_empty() {
            layers.push(PreviewLayer {
                key: "extra-overlay".to_string(),
                step: StepKey::Extra,
                url: url.to_string(),
                z_index: EXTRA_OVERLAY_Z_INDEX,
            });
        }
    }

    layers.sort_by_key(|layer| layer.z_index);
    layers
}

fn z_index_for(step: StepKey, explicit: i32) -> i32 {
    if explicit > 0 {
        explicit
    } else {
        step.default_z_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::ids::{FunctionId, OptionId};

    fn state(function: &str, picks: &[(StepKey, &str)]) -> SelectionState {
        let mut state = SelectionState::new();
        state.function = Some(FunctionId::new(function));
        for (step, id) in picks {
            state.selections.insert(*step, OptionId::new(*id));
        }
        state
    }

    #[test]
    fn test_layers_sorted_by_step_default() {
        let catalog = default_catalog();
        let state = state(
            "oak",
            &[
                (StepKey::Strap, "rubber-sport"),
                (StepKey::Case, "black"),
                (StepKey::Hands, "sword-black"),
                (StepKey::Dial, "onyx-black"),
            ],
        );

        let layers = derive_layers(&catalog, &state);
        let z: Vec<i32> = layers.iter().map(|l| l.z_index).collect();
        assert_eq!(z, vec![10, 20, 30, 40]);
        assert_eq!(layers[0].key, "case-black");
        assert_eq!(layers[0].url, "/images/configurator/case/black.png");
    }

    #[test]
    fn test_explicit_z_index_wins() {
        let mut catalog = default_catalog();
        let dial = catalog
            .options
            .iter_mut()
            .find(|o| o.id.as_str() == "onyx-black")
            .unwrap();
        dial.layer = Some(LayerImage {
            image_url: Some("/dial.png".to_string()),
            z_index: 45,
            ..LayerImage::default()
        });

        let state = state(
            "oak",
            &[(StepKey::Dial, "onyx-black"), (StepKey::Strap, "rubber-sport")],
        );
        let layers = derive_layers(&catalog, &state);
        assert_eq!(layers.last().map(|l| l.url.as_str()), Some("/dial.png"));
        assert_eq!(layers.last().map(|l| l.z_index), Some(45));
    }

    #[test]
    fn test_options_without_images_are_skipped() {
        let mut catalog = default_catalog();
        for option in catalog.options.iter_mut() {
            if option.step == StepKey::Case {
                option.layer = None;
            }
        }
        let state = state("oak", &[(StepKey::Case, "black"), (StepKey::Dial, "champagne")]);
        let layers = derive_layers(&catalog, &state);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].step, StepKey::Dial);
    }

    #[test]
    fn test_no_function_no_layers() {
        let catalog = default_catalog();
        let mut state = SelectionState::new();
        state.selections.insert(StepKey::Case, OptionId::new("black"));
        assert!(derive_layers(&catalog, &state).is_empty());
    }

    #[test]
    fn test_function_layer_drawn_first() {
        let mut catalog = default_catalog();
        catalog.functions[0].layer = Some(LayerImage::layer("/oak.png"));

        let only_function = state("oak", &[]);
        let layers = derive_layers(&catalog, &only_function);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].key, "function-oak");
        assert_eq!(layers[0].step, StepKey::Function);
        assert_eq!(layers[0].z_index, 0);

        let with_case = state("oak", &[(StepKey::Case, "black")]);
        let z: Vec<i32> = derive_layers(&catalog, &with_case).iter().map(|l| l.z_index).collect();
        assert_eq!(z, vec![0, 10]);
    }

    #[test]
    fn test_function_layer_explicit_z_index() {
        let mut catalog = default_catalog();
        catalog.functions[0].layer = Some(LayerImage {
            image_url: Some("/oak.png".to_string()),
            z_index: 15,
            ..LayerImage::default()
        });
        let state = state("oak", &[(StepKey::Case, "black"), (StepKey::Dial, "champagne")]);
        let keys: Vec<String> = derive_layers(&catalog, &state)
            .into_iter()
            .map(|l| l.key)
            .collect();
        assert_eq!(keys, vec!["case-black", "function-oak", "dial-champagne"]);
    }

    #[test]
    fn test_extra_overlay_on_top() {
        let mut catalog = default_catalog();
        catalog.functions[0].extra_overlay = Some("/oak-rotor.png".to_string());

        let state = state("oak", &[(StepKey::Case, "black"), (StepKey::Extra, "custom-rotor-1")]);
        let layers = derive_layers(&catalog, &state);
        let last = layers.last().unwrap();
        assert_eq!(last.key, "extra-overlay");
        assert_eq!(last.url, "/oak-rotor.png");
        assert_eq!(last.z_index, EXTRA_OVERLAY_Z_INDEX);
        assert_eq!(layers.len(), 3);
    }

    #[test]
    fn test_extra_overlay_needs_other_layers_and_extra_step() {
        let mut catalog = default_catalog();
        for function in catalog.functions.iter_mut() {
            function.extra_overlay = Some("/overlay.png".to_string());
        }

        assert!(derive_layers(&catalog, &state("oak", &[])).is_empty());

        let naut = state("naut", &[(StepKey::Case, "black")]);
        let layers = derive_layers(&catalog, &naut);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].key, "case-black");
    }

    #[test]
    fn test_extra_option_without_image_uses_overlay() {
        let mut catalog = default_catalog();
        catalog.functions[0].extra_overlay = Some("/oak-rotor.png".to_string());
        for option in catalog.options.iter_mut() {
            if option.step == StepKey::Extra {
                option.layer = None;
            }
        }

        let state = state("oak", &[(StepKey::Extra, "custom-rotor-2")]);
        let layers = derive_layers(&catalog, &state);
        let urls: Vec<(&str, i32)> = layers.iter().map(|l| (l.url.as_str(), l.z_index)).collect();
        assert_eq!(urls, vec![("/oak-rotor.png", 50), ("/oak-rotor.png", 55)]);
        assert_eq!(layers[0].key, "extra-custom-rotor-2");
    }
}
