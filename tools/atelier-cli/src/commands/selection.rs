//! Turns command line picks into a configurator session.

use anyhow::{anyhow, bail, Context as _, Result};
use atelier_commerce::prelude::*;

use super::BuildArgs;

/// Parse `step=option`.
pub fn parse_pick(pick: &str) -> Result<(StepKey, OptionId)> {
    let (step, option) = pick
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid pick '{}': expected STEP=OPTION", pick))?;
    let step = StepKey::from_str(step.trim())
        .ok_or_else(|| anyhow!("Unknown step '{}'", step.trim()))?;
    if step == StepKey::Function {
        bail!("Use --function to choose the watch function");
    }
    let option = option.trim();
    if option.is_empty() {
        bail!("Invalid pick '{}': option is empty", pick);
    }
    Ok((step, OptionId::new(option)))
}

/// Build a configurator from picks or a saved payload.
pub fn configure<'c>(catalog: &'c CatalogSnapshot, args: &BuildArgs) -> Result<Configurator<'c>> {
    if let Some(path) = &args.payload {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload: {}", path))?;
        let payload: SubmissionPayload = serde_json::from_str(&content)
            .with_context(|| format!("Invalid payload: {}", path))?;
        let state = payload.to_state(catalog)?;
        return Ok(Configurator::restore(catalog, state));
    }

    let function = args
        .function
        .as_deref()
        .ok_or_else(|| anyhow!("A function is required (--function)"))?;
    let function = FunctionId::new(function);
    if catalog.function(&function).is_none() {
        bail!("Unknown function '{}'", function);
    }

    let mut configurator = Configurator::new(catalog);
    configurator.select_function(function);

    for pick in &args.picks {
        let (step, option) = parse_pick(pick)?;
        configurator
            .set_step_selection(step, Some(option))
            .with_context(|| format!("Cannot apply '{}'", pick))?;
    }

    for addon in &args.addons {
        let id = AddonId::new(addon.as_str());
        if catalog.addon(&id).is_none() {
            bail!("Unknown add-on '{}'", addon);
        }
        configurator.toggle_addon(id, true);
    }

    Ok(configurator)
}

/// Advance through every step, failing at the first one that blocks.
pub fn walk_to_end(configurator: &mut Configurator<'_>) -> Result<SubmissionPayload> {
    loop {
        match configurator.advance()? {
            Advance::Moved(_) => {}
            Advance::Submit(payload) => return Ok(payload),
            Advance::Blocked => bail!(
                "Step '{}' needs a selection",
                configurator.current_step()
            ),
        }
    }
}
