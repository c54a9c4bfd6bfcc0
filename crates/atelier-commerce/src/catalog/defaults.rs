//! Built-in configurator catalog used when no data provider is configured.

use super::{Addon, CatalogSnapshot, LayerImage, OptionItem, Step, StepKey, WatchFunction};
use crate::i18n::LocalizedText;
use crate::ids::{AddonId, FunctionId, OptionId};
use crate::money::Currency;

static FUNCTIONS: [(&str, &str, &str); 8] = [
    ("oak", "Oak", "O"),
    ("naut", "Naut", "N"),
    ("skeleton", "Skeleton", "S"),
    ("classic-date", "Classic Date", "C"),
    ("chronograph", "Chronograph", "C"),
    ("day-date", "Day-Date", "D"),
    ("submariner", "Submariner", "S"),
    ("gmt", "GMT", "G"),
];

// (id, en, fr, letter, price in whole dollars)
static SIZES: [(&str, &str, &str, &str, i64); 3] = [
    ("36mm", "36 mm", "36 mm", "3", 0),
    ("39mm", "39 mm", "39 mm", "3", 0),
    ("41mm", "41 mm", "41 mm", "4", 100),
];

static CASES: [(&str, &str, &str, &str, i64); 4] = [
    ("yellow-gold", "Yellow Gold", "Or jaune", "Y", 1500),
    ("black", "Black", "Noir", "B", 900),
    ("rose-gold", "Rose Gold", "Or rose", "R", 1500),
    ("stainless-steel", "Stainless Steel", "Acier inoxydable", "S", 800),
];

static DIALS: [(&str, &str, &str, &str, i64); 4] = [
    ("arctic-white", "Arctic White", "Blanc arctique", "A", 150),
    ("onyx-black", "Onyx Black", "Noir onyx", "O", 160),
    ("midnight-blue", "Midnight Blue", "Bleu minuit", "M", 180),
    ("champagne", "Champagne Gold", "Or champagne", "C", 220),
];

static HANDS: [(&str, &str, &str, &str, i64); 3] = [
    ("sword-black", "Sword Black", "Glaive noir", "S", 95),
    ("dauphine-silver", "Dauphine Silver", "Dauphine argent", "D", 85),
    ("cathedral-rose", "Cathedral Rose", "Cathédrale rose", "C", 110),
];

static STRAPS: [(&str, &str, &str, &str, i64); 4] = [
    ("steel-bracelet", "Steel Bracelet", "Bracelet acier", "S", 280),
    ("italian-leather-black", "Italian Leather Black", "Cuir italien noir", "I", 120),
    ("italian-leather-brown", "Italian Leather Brown", "Cuir italien brun", "I", 120),
    ("rubber-sport", "Rubber Sport", "Caoutchouc sport", "R", 75),
];

static EXTRAS: [(&str, &str, &str, &str, i64); 3] = [
    ("custom-rotor-1", "Custom Rotor (Engraved)", "Rotor personnalisé (gravé)", "C", 500),
    ("custom-rotor-2", "Custom Rotor (Gold)", "Rotor personnalisé (or)", "C", 750),
    ("custom-rotor-3", "Custom Rotor (Skeleton)", "Rotor personnalisé (squelette)", "C", 600),
];

fn step_options(
    step: StepKey,
    rows: &'static [(&'static str, &'static str, &'static str, &'static str, i64)],
) -> impl Iterator<Item = OptionItem> {
    rows.iter().map(move |(id, en, fr, letter, dollars)| {
        OptionItem::new(*id, step, LocalizedText::new(*en, *fr), *letter, dollars * 100).with_layer(
            LayerImage::layer(format!("/images/configurator/{}/{}.png", step.as_str(), id)),
        )
    })
}

/// The storefront's shipped catalog.
///
/// `day-date` adds a size step, `oak` adds an optional extra step, and the
/// exhibition case back is only offered on `skeleton`.
pub fn default_catalog() -> CatalogSnapshot {
    let functions = FUNCTIONS
        .iter()
        .map(|(id, label, letter)| WatchFunction::new(*id, LocalizedText::same(*label), *letter))
        .collect();

    let step = |key: StepKey, position: u32, optional: bool, functions: Option<&[&str]>| Step {
        key,
        label: key.default_label(),
        optional,
        position,
        functions: functions.map(|ids| ids.iter().map(|id| FunctionId::new(*id)).collect()),
    };

    let steps = vec![
        step(StepKey::Size, 10, false, Some(&["day-date"][..])),
        step(StepKey::Case, 20, false, None),
        step(StepKey::Dial, 30, false, None),
        step(StepKey::Hands, 40, false, None),
        step(StepKey::Strap, 50, false, None),
        step(StepKey::Extra, 60, true, Some(&["oak"][..])),
    ];

    let mut options: Vec<OptionItem> = Vec::new();
    options.extend(step_options(StepKey::Size, &SIZES));
    options.extend(step_options(StepKey::Case, &CASES));
    options.push(
        OptionItem::new(
            "exhibition-back",
            StepKey::Case,
            LocalizedText::new("Exhibition Case Back", "Fond saphir"),
            "E",
            40_000,
        )
        .for_function("skeleton")
        .with_layer(LayerImage {
            layer_image_url: Some("/images/configurator/case/exhibition-back.png".to_string()),
            z_index: 12,
            ..LayerImage::default()
        }),
    );
    options.extend(step_options(StepKey::Dial, &DIALS));
    options.extend(step_options(StepKey::Hands, &HANDS));
    options.extend(step_options(StepKey::Strap, &STRAPS));
    options.extend(step_options(StepKey::Extra, &EXTRAS));

    let addons = vec![Addon {
        id: AddonId::new("frosted-finish"),
        step: StepKey::Case,
        option_ids: vec![OptionId::new("black"), OptionId::new("stainless-steel")],
        label: LocalizedText::new("Frosted Finish", "Finition givrée"),
        price_cents: 20_000,
    }];

    CatalogSnapshot {
        currency: Currency::USD,
        functions,
        steps,
        options,
        addons,
    }
}
