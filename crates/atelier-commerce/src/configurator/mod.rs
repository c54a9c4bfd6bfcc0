//! Configurator module.
//!
//! Step navigation, selection, pricing and preview layers for a custom
//! watch build, plus the payload handed to checkout.

mod engine;
mod preview;
mod pricing;
mod state;
mod submission;

pub use engine::{Advance, Configurator};
pub use preview::{derive_layers, PreviewLayer, EXTRA_OVERLAY_Z_INDEX};
pub use pricing::{price_selection, ConfigLineItem, LineSource, PricedConfiguration};
pub use state::SelectionState;
pub use submission::{reprice, SubmissionPayload};
