//! Orders module.
//!
//! Contains order records, the store boundary, carrier tracking, order
//! e-mails and the fulfillment service fed by the payment webhook.

mod fulfillment;
mod notify;
mod order;
mod store;
mod tracking;

pub use fulfillment::{
    CompletedSession, FulfillmentError, FulfillmentService, OrderTrackingView, WebhookEvent,
    CHECKOUT_SESSION_COMPLETED,
};
pub use notify::{LogNotifier, NotifyError, OrderEmail, OrderNotifier, DEFAULT_ATELIER_EMAIL};
pub use order::{
    generate_order_number, ConfigurationOptions, ConfigurationRecord, ConfigurationStatus, Order,
    OrderStatus, ORDER_NUMBER_PREFIX,
};
pub use store::{InMemoryStore, OrderStore, StoreError, StoreResult};
pub use tracking::{encode_uri_component, Carrier, Tracking};
