//! Catalog listing.

use anyhow::{bail, Result};
use atelier_commerce::prelude::*;
use serde::Serialize;

use super::CatalogArgs;
use crate::context::Context;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    if args.products {
        return list_products(ctx);
    }

    let catalog = ctx.catalog()?;
    let locale = args.locale.unwrap_or(ctx.config.checkout.locale);

    match args.function {
        Some(function) => show_function(&catalog, &FunctionId::new(function), locale, ctx),
        None => list_functions(&catalog, locale, ctx),
    }
}

#[derive(Serialize)]
struct FunctionRow<'a> {
    id: &'a FunctionId,
    label: &'a str,
    steps: Vec<StepKey>,
}

fn list_functions(catalog: &CatalogSnapshot, locale: Locale, ctx: &Context) -> Result<()> {
    if catalog.is_empty() {
        ctx.output.warn("The catalog has no functions; the configurator cannot start.");
        return Ok(());
    }

    let rows: Vec<FunctionRow<'_>> = catalog
        .functions
        .iter()
        .map(|function| FunctionRow {
            id: &function.id,
            label: function.label.get(locale),
            steps: catalog
                .steps_for_function(&function.id)
                .into_iter()
                .map(|step| step.key)
                .collect(),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Functions");
    for row in &rows {
        let steps: Vec<&str> = row.steps.iter().map(|s| s.as_str()).collect();
        ctx.output
            .table_row(&[row.id.as_str(), row.label, steps.join(" → ").as_str()], &[14, 14, 0]);
    }
    ctx.output.info("");
    ctx.output
        .info("Run `atelier catalog --function <id>` to list the options of a function.");

    Ok(())
}

#[derive(Serialize)]
struct StepListing<'a> {
    step: StepKey,
    label: String,
    optional: bool,
    options: Vec<OptionRow<'a>>,
    addons: Vec<OptionRow<'a>>,
}

#[derive(Serialize)]
struct OptionRow<'a> {
    id: &'a str,
    label: &'a str,
    price: Money,
}

fn show_function(
    catalog: &CatalogSnapshot,
    function: &FunctionId,
    locale: Locale,
    ctx: &Context,
) -> Result<()> {
    let Some(entry) = catalog.function(function) else {
        bail!("Unknown function '{}'", function);
    };

    let listing: Vec<StepListing<'_>> = catalog
        .steps_for_function(function)
        .into_iter()
        .map(|step| StepListing {
            step: step.key,
            label: step.label.get(locale).to_string(),
            optional: step.optional,
            options: catalog
                .visible_options(step.key, Some(function))
                .into_iter()
                .map(|option| OptionRow {
                    id: option.id.as_str(),
                    label: option.label.get(locale),
                    price: catalog.money(option.price_cents),
                })
                .collect(),
            addons: catalog
                .addons_for_step(step.key)
                .into_iter()
                .map(|addon| OptionRow {
                    id: addon.id.as_str(),
                    label: addon.label.get(locale),
                    price: catalog.money(addon.price_cents),
                })
                .collect(),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&listing);
        return Ok(());
    }

    ctx.output.header(entry.label.get(locale));
    for step in &listing {
        let title = if step.optional {
            format!("{} ({}, optional)", step.label, step.step)
        } else {
            format!("{} ({})", step.label, step.step)
        };
        ctx.output.info(&title);
        for option in &step.options {
            ctx.output.table_row(
                &[option.id, option.label, option.price.display().as_str()],
                &[24, 32, 0],
            );
        }
        for addon in &step.addons {
            ctx.output.list_item(&format!(
                "add-on {}: {} (+{})",
                addon.id,
                addon.label,
                addon.price.display()
            ));
        }
    }

    Ok(())
}

fn list_products(ctx: &Context) -> Result<()> {
    let products = ctx.products()?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header("Ready-made watches");
    if products.is_empty() {
        ctx.output.info("No products configured. Add [[products]] entries to atelier.toml.");
        return Ok(());
    }
    for product in &products {
        let availability = if !product.active {
            "hidden".to_string()
        } else if product.stock < 1 {
            "sold out".to_string()
        } else {
            format!("{} in stock", product.stock)
        };
        ctx.output.table_row(
            &[
                product.id.as_str(),
                product.name.as_str(),
                product.price.display().as_str(),
                availability.as_str(),
            ],
            &[20, 24, 12, 0],
        );
    }

    Ok(())
}
