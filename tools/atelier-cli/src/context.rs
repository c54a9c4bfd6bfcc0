//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use atelier_commerce::catalog::{default_catalog, CatalogSnapshot, Product};

use crate::config::AtelierConfig;
use crate::output::Output;

/// Config file names, searched from the working directory upward.
pub const CONFIG_NAMES: [&str; 3] = ["atelier.toml", ".atelier.toml", "atelier.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: AtelierConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            AtelierConfig::load(path)?
        } else {
            // Try to find config in current directory or parent directories
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self { config, output, cwd })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<AtelierConfig> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = AtelierConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// The catalog snapshot named in the config, or the shipped one.
    pub fn catalog(&self) -> Result<CatalogSnapshot> {
        let Some(path) = &self.config.catalog else {
            return Ok(default_catalog());
        };

        let path = self.resolve_path(path);
        self.output.debug(&format!("Loading catalog from {}", path.display()));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        CatalogSnapshot::from_json(&content)
            .with_context(|| format!("Invalid catalog: {}", path.display()))
    }

    /// Ready-made watches from the config, validated.
    pub fn products(&self) -> Result<Vec<Product>> {
        self.config
            .products
            .iter()
            .cloned()
            .map(|input| {
                let name = input.name.clone();
                input
                    .into_product(self.config.checkout.currency)
                    .with_context(|| format!("Invalid product: {}", name))
            })
            .collect()
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
