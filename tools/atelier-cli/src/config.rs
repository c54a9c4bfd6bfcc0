//! CLI configuration.

use anyhow::{Context, Result};
use atelier_commerce::catalog::ProductInput;
use atelier_commerce::orders::DEFAULT_ATELIER_EMAIL;
use atelier_commerce::{Currency, Locale};
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtelierConfig {
    /// Path to a catalog snapshot in JSON. The shipped catalog is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// Checkout configuration.
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Notification configuration.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Ready-made watches on sale.
    #[serde(default)]
    pub products: Vec<ProductInput>,
}

impl AtelierConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&content, path.ends_with(".json"))
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Parse config text as JSON or TOML.
    pub fn parse(content: &str, json: bool) -> Result<Self> {
        let config = if json {
            serde_json::from_str(content)?
        } else {
            toml::from_str(content)?
        };
        Ok(config)
    }
}

/// Checkout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Public site URL used for success and cancel redirects.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Base URL of the hosted payment page.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Currency for ready-made watch prices.
    #[serde(default)]
    pub currency: Currency,

    /// Locale used when a command does not pass one.
    #[serde(default)]
    pub locale: Locale,
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_gateway_url() -> String {
    "https://checkout.example.com/pay".to_string()
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            gateway_url: default_gateway_url(),
            currency: Currency::default(),
            locale: Locale::default(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Atelier inbox that receives a copy of every order.
    #[serde(default = "default_atelier_email")]
    pub atelier_email: String,
}

fn default_atelier_email() -> String {
    DEFAULT_ATELIER_EMAIL.to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            atelier_email: default_atelier_email(),
        }
    }
}

/// Generate a default atelier.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Civaglia atelier configuration

# catalog = "catalog.json"

[checkout]
site_url = "{site_url}"
gateway_url = "{gateway_url}"
currency = "USD"
locale = "en"

[notifications]
atelier_email = "{atelier_email}"

[[products]]
id = "heritage-36"
name = "Heritage 36"
description = "Ready to wear, steel case on a leather strap"
price = 4200.0
stock = 3
"#,
        site_url = default_site_url(),
        gateway_url = default_gateway_url(),
        atelier_email = DEFAULT_ATELIER_EMAIL,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AtelierConfig::parse(&generate_default_config(), false).unwrap();
        assert_eq!(config.catalog, None);
        assert_eq!(config.checkout.site_url, "http://localhost:3000");
        assert_eq!(config.checkout.currency, Currency::USD);
        assert_eq!(config.notifications.atelier_email, DEFAULT_ATELIER_EMAIL);
        assert_eq!(config.products.len(), 1);
        assert_eq!(config.products[0].stock, 3);
        assert!(config.products[0].active);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AtelierConfig::parse("catalog = \"shop.json\"", false).unwrap();
        assert_eq!(config.catalog.as_deref(), Some("shop.json"));
        assert_eq!(config.checkout.locale, Locale::En);
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_json_config() {
        let json = r#"{"checkout": {"site_url": "https://civaglia.example", "locale": "fr"}}"#;
        let config = AtelierConfig::parse(json, true).unwrap();
        assert_eq!(config.checkout.site_url, "https://civaglia.example");
        assert_eq!(config.checkout.locale, Locale::Fr);
        assert_eq!(config.checkout.gateway_url, default_gateway_url());
    }
}
