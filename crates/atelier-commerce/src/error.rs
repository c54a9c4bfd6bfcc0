//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in catalog, configurator, pricing and cart operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Catalog snapshot failed validation.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Step is not part of the active sequence for the selected function.
    #[error("Step {0} is not part of the current configuration")]
    StepNotActive(String),

    /// Option is unknown or not visible for the step and function.
    #[error("Option {option} is not available for step {step}")]
    OptionNotAvailable { step: String, option: String },

    /// Add-on id is unknown.
    #[error("Unknown add-on: {0}")]
    UnknownAddon(String),

    /// Add-on is not offered for the current selection.
    #[error("Add-on {0} is not offered for the selected option")]
    AddonNotEligible(String),

    /// Submitted selection does not cover the required steps.
    #[error("Configuration incomplete: missing {0}")]
    ConfigurationIncomplete(String),

    /// Submitted option ids do not line up with the step sequence.
    #[error("Submitted {got} selections but the configuration has {expected} steps")]
    SequenceMismatch { expected: usize, got: usize },

    /// Client price differs from the recomputed price.
    #[error("Price mismatch: submitted {submitted}, computed {computed}")]
    PriceMismatch { submitted: String, computed: String },

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Admin product payload failed validation.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
