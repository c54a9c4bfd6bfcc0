//! Catalog module.
//!
//! Contains the configurator snapshot (functions, steps, options, add-ons)
//! and the built-watch products sold from the shop grid.

mod defaults;
mod options;
mod product;

pub use defaults::default_catalog;
pub use options::{Addon, CatalogSnapshot, LayerImage, OptionItem, Step, StepKey, WatchFunction};
pub use product::{slugify, Product, ProductInput, DEFAULT_PRODUCT_IMAGE};
