//! Preview layer stack.

use anyhow::Result;

use super::{configure, BuildArgs};
use crate::context::Context;

/// Run the layers command.
pub async fn run(args: BuildArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let configurator = configure(&catalog, &args)?;
    let layers = configurator.derive_layers();

    if ctx.output.is_json() {
        ctx.output.json(&layers);
        return Ok(());
    }

    ctx.output.header("Preview layers (back to front)");
    if layers.is_empty() {
        ctx.output.info("No selected option has a preview image.");
        return Ok(());
    }
    for layer in &layers {
        ctx.output.table_row(
            &[layer.z_index.to_string().as_str(), layer.step.as_str(), layer.url.as_str()],
            &[4, 8, 0],
        );
    }

    Ok(())
}
