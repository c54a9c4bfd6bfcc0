//! Build pricing.

use anyhow::Result;
use atelier_commerce::prelude::*;
use serde::Serialize;

use super::{configure, walk_to_end, BuildArgs};
use crate::context::Context;

#[derive(Serialize)]
struct Quote {
    #[serde(flatten)]
    priced: PricedConfiguration,
    /// First step still missing a selection, if any.
    missing: Option<String>,
    payload: SubmissionPayload,
}

/// Run the quote command.
pub async fn run(args: BuildArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let locale = args.locale.unwrap_or(ctx.config.checkout.locale);
    let configurator = configure(&catalog, &args)?;

    let priced = configurator.priced(locale)?;
    let payload = configurator.submission_payload()?;
    let missing = walk_to_end(&mut configurator.clone())
        .err()
        .map(|err| err.to_string());

    if ctx.output.is_json() {
        ctx.output.json(&Quote {
            priced,
            missing,
            payload,
        });
        return Ok(());
    }

    let title = priced
        .function
        .as_ref()
        .and_then(|id| catalog.function(id))
        .map(|function| function.label.get(locale).to_string())
        .unwrap_or_else(|| "Build".to_string());
    ctx.output.header(&title);

    for item in &priced.line_items {
        ctx.output
            .table_row(&[item.label.as_str(), item.price.display().as_str()], &[48, 0]);
    }
    ctx.output.table_row(&["Total", priced.total.display().as_str()], &[48, 0]);
    ctx.output.info("");

    match missing {
        Some(reason) => ctx.output.warn(&format!("Incomplete: {}", reason)),
        None => ctx.output.success("Ready for checkout"),
    }
    ctx.output
        .debug(&format!("Payload: {}", serde_json::to_string(&payload)?));

    Ok(())
}
