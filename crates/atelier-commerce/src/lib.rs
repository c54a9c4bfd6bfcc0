//! Domain types and logic for the Civaglia watch storefront.
//!
//! - **Catalog**: configurator functions, steps, options and add-ons; built watches
//! - **Configurator**: step navigation, pricing, preview layers, submission payload
//! - **Cart**: guest cart and add-to-cart events
//! - **Checkout**: server-side re-pricing and payment session creation
//! - **Orders**: webhook fulfillment, order tracking, notification e-mails
//!
//! # Example
//!
//! ```rust
//! use atelier_commerce::prelude::*;
//!
//! let catalog = default_catalog();
//! let mut configurator = Configurator::new(&catalog);
//!
//! configurator.select_function(FunctionId::new("oak"));
//! configurator.set_step_selection(StepKey::Case, Some(OptionId::new("black"))).unwrap();
//! configurator.set_step_selection(StepKey::Dial, Some(OptionId::new("onyx-black"))).unwrap();
//!
//! let total = configurator.compute_total().unwrap();
//! assert_eq!(total.display(), "$1,060.00");
//! ```

pub mod error;
pub mod i18n;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod configurator;
pub mod orders;

pub use error::CommerceError;
pub use i18n::{Locale, LocalizedText};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::i18n::{Locale, LocalizedText};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        default_catalog, Addon, CatalogSnapshot, LayerImage, OptionItem, Product, ProductInput,
        Step, StepKey, WatchFunction,
    };

    // Configurator
    pub use crate::configurator::{
        reprice, Advance, ConfigLineItem, Configurator, LineSource, PreviewLayer,
        PricedConfiguration, SelectionState, SubmissionPayload,
    };

    // Cart
    pub use crate::cart::{Cart, CartEvent, CartEvents, CartItem, NewCartItem};

    // Checkout
    pub use crate::checkout::{
        CheckoutError, CheckoutRequest, CheckoutService, CheckoutSession, CheckoutSessionRequest,
        CheckoutSubmitter, CheckoutType, GatewayError, PaymentGateway,
    };

    // Orders
    pub use crate::orders::{
        Carrier, FulfillmentError, FulfillmentService, InMemoryStore, Order, OrderEmail,
        OrderNotifier, OrderStatus, OrderStore, Tracking, WebhookEvent,
    };
}
