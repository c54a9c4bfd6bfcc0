//! Checkout module.
//!
//! Contains the storefront checkout request, the payment session handed to
//! the gateway, and the service that prices and records a purchase.

mod gateway;
mod request;
mod service;
mod session;

pub use gateway::{CheckoutSubmitter, GatewayError, InMemoryGateway, PaymentGateway};
pub use request::{CheckoutRequest, CheckoutType};
pub use service::{CheckoutError, CheckoutService, CheckoutSettings};
pub use session::{
    CheckoutSession, CheckoutSessionRequest, SessionLineItem, SessionMetadata,
    SESSION_ID_PLACEHOLDER,
};
