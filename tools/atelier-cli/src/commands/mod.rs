//! CLI command implementations.

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod layers;
pub mod quote;
pub mod track;

mod selection;

use atelier_commerce::Locale;
use clap::{Args, Subcommand};

pub use selection::{configure, walk_to_end};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only show the steps and options of this function.
    #[arg(short, long)]
    pub function: Option<String>,

    /// Label language.
    #[arg(short, long, value_parser = parse_locale)]
    pub locale: Option<Locale>,

    /// List ready-made watches instead of configurator options.
    #[arg(long)]
    pub products: bool,
}

/// A build described on the command line.
#[derive(Args, Clone, Default)]
pub struct BuildArgs {
    /// Watch function (e.g. oak, skeleton, day-date).
    #[arg(short, long)]
    pub function: Option<String>,

    /// Option for a step, as `step=option`. Repeatable.
    #[arg(short, long = "pick", value_name = "STEP=OPTION")]
    pub picks: Vec<String>,

    /// Add-on to include. Repeatable.
    #[arg(short, long = "addon", value_name = "ADDON")]
    pub addons: Vec<String>,

    /// Read a saved submission payload (JSON) instead of picks.
    #[arg(long, conflicts_with_all = ["function", "picks", "addons"])]
    pub payload: Option<String>,

    /// Label language.
    #[arg(short, long, value_parser = parse_locale)]
    pub locale: Option<Locale>,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Buy a ready-made watch instead of a custom build.
    #[arg(long, conflicts_with_all = ["function", "picks", "addons", "payload"])]
    pub product: Option<String>,

    /// Signed-in customer id.
    #[arg(long)]
    pub user: Option<String>,

    /// Simulate the payment completion webhook and fulfill the order.
    #[arg(long)]
    pub complete: bool,

    /// Customer e-mail used when completing.
    #[arg(long, requires = "complete")]
    pub email: Option<String>,
}

/// Arguments for the track-url command.
#[derive(Args)]
pub struct TrackUrlArgs {
    /// Carrier name (Canada Post, UPS, DHL, FedEx, Purolator, USPS, Other).
    pub carrier: String,

    /// Tracking number.
    pub number: String,

    /// Manual tracking URL; wins over the carrier template.
    #[arg(long)]
    pub url: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file, catalog and products.
    Validate,
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    Locale::parse(s).ok_or_else(|| format!("unsupported locale '{}' (expected en or fr)", s))
}
