//! Atelier CLI - Command line tool for the Civaglia configurator.
//!
//! Commands:
//! - `atelier catalog` - List functions, steps and options
//! - `atelier quote` - Price a build
//! - `atelier layers` - Show the preview layer stack for a build
//! - `atelier checkout` - Open a payment session and optionally fulfill it
//! - `atelier track-url` - Build a carrier tracking link
//! - `atelier config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CatalogArgs, CheckoutArgs, ConfigArgs, TrackUrlArgs};

/// Atelier CLI - Price, preview and check out Civaglia watch builds
#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configurator catalog
    Catalog(CatalogArgs),

    /// Price a build and print its line items
    Quote(BuildArgs),

    /// Show the stacked preview layers for a build
    Layers(BuildArgs),

    /// Open a checkout session for a build or a ready-made watch
    Checkout(CheckoutArgs),

    /// Print the tracking link for a shipment
    TrackUrl(TrackUrlArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "atelier_commerce=debug,atelier_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Quote(args) => commands::quote::run(args, &ctx).await,
        Commands::Layers(args) => commands::layers::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::TrackUrl(args) => commands::track::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
