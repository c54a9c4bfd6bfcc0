//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.kv(
        "catalog",
        ctx.config.catalog.as_deref().unwrap_or("(built-in)"),
    );

    // Checkout section
    ctx.output.info("");
    ctx.output.info("[checkout]");
    ctx.output.kv("site_url", &ctx.config.checkout.site_url);
    ctx.output.kv("gateway_url", &ctx.config.checkout.gateway_url);
    ctx.output.kv("currency", ctx.config.checkout.currency.code());
    ctx.output.kv("locale", ctx.config.checkout.locale.as_str());

    // Notifications section
    ctx.output.info("");
    ctx.output.info("[notifications]");
    ctx.output
        .kv("atelier_email", &ctx.config.notifications.atelier_email);

    // Products
    if !ctx.config.products.is_empty() {
        ctx.output.info("");
        ctx.output.info("Products:");
        for product in &ctx.config.products {
            ctx.output.list_item(&product.name);
        }
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    match ctx.catalog() {
        Ok(catalog) if catalog.is_empty() => {
            warnings.push("catalog has no functions".to_string());
        }
        Ok(_) => {}
        Err(e) => errors.push(format!("{:#}", e)),
    }

    if let Err(e) = ctx.products() {
        errors.push(format!("{:#}", e));
    }

    for (field, url) in [
        ("checkout.site_url", &ctx.config.checkout.site_url),
        ("checkout.gateway_url", &ctx.config.checkout.gateway_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("{} must be an http(s) URL", field));
        }
    }

    if !ctx.config.notifications.atelier_email.contains('@') {
        warnings.push(
            "notifications.atelier_email does not look like an e-mail address".to_string(),
        );
    }

    // Print results
    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
