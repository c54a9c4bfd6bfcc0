//! Shopping cart module.
//!
//! Guest cart entries for built watches and custom builds, plus the event
//! channel the UI listens on for add-to-cart toasts.

mod cart;
mod events;

pub use cart::{Cart, CartItem, NewCartItem, CUSTOM_PRODUCT_PREFIX, MAX_QUANTITY_PER_ITEM};
pub use events::{CartEvent, CartEvents};
