//! Payment webhook handling, order administration and public tracking.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    Carrier, Order, OrderEmail, OrderNotifier, OrderStatus, OrderStore, StoreError, Tracking,
    DEFAULT_ATELIER_EMAIL,
};
use crate::checkout::SessionMetadata;
use crate::ids::{CheckoutSessionId, OrderId};
use crate::money::{Currency, Money};

/// The only event type that creates orders.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

const DEFAULT_ORDER_SUMMARY: &str = "Civaglia order";

/// Fulfillment errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FulfillmentError {
    #[error("Missing order number")]
    MissingOrderNumber,

    #[error("Order not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A payment processor event whose signature has already been verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub session: CompletedSession,
}

/// Checkout session fields carried by a completion event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub id: CheckoutSessionId,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Amount charged in minor units.
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub customer_email: Option<String>,
    /// E-mail entered on the payment page; preferred over `customer_email`.
    #[serde(default)]
    pub customer_details_email: Option<String>,
    /// Lowercase ISO code of the charge.
    #[serde(default)]
    pub currency: Option<String>,
}

impl CompletedSession {
    fn email(&self) -> Option<&str> {
        [&self.customer_details_email, &self.customer_email]
            .into_iter()
            .flatten()
            .map(|e| e.trim())
            .find(|e| !e.is_empty())
    }
}

/// Public view of an order, as returned by the tracking lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTrackingView {
    pub order_number: String,
    pub status: OrderStatus,
    pub summary: String,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub tracking_number: Option<String>,
    pub tracking_carrier: Option<Carrier>,
    pub tracking_url: Option<String>,
}

impl From<Order> for OrderTrackingView {
    fn from(order: Order) -> Self {
        Self {
            order_number: order.order_number,
            status: order.status,
            summary: order.summary,
            total: order.total,
            created_at: order.created_at,
            tracking_number: order.tracking.number,
            tracking_carrier: order.tracking.carrier,
            tracking_url: order.tracking.url,
        }
    }
}

/// Turns completed payments into orders.
pub struct FulfillmentService<S: OrderStore, N: OrderNotifier> {
    store: Arc<S>,
    notifier: N,
    atelier_email: String,
    /// Used when an event carries no known currency.
    fallback_currency: Currency,
}

impl<S: OrderStore, N: OrderNotifier> FulfillmentService<S, N> {
    pub fn new(store: Arc<S>, notifier: N) -> Self {
        Self {
            store,
            notifier,
            atelier_email: DEFAULT_ATELIER_EMAIL.to_string(),
            fallback_currency: Currency::default(),
        }
    }

    /// Set the atelier notification address.
    pub fn with_atelier_email(mut self, email: impl Into<String>) -> Self {
        self.atelier_email = email.into();
        self
    }

    /// Currency for events that do not state one.
    pub fn with_fallback_currency(mut self, currency: Currency) -> Self {
        self.fallback_currency = currency;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Process a webhook event.
    ///
    /// Returns the created order, or `None` for ignored events and repeated
    /// deliveries of an already-fulfilled session. Notification failures are
    /// logged and do not fail the event.
    pub async fn handle_event(
        &self,
        event: &WebhookEvent,
    ) -> Result<Option<Order>, FulfillmentError> {
        if event.event_type != CHECKOUT_SESSION_COMPLETED {
            debug!(event_type = %event.event_type, "ignoring webhook event");
            return Ok(None);
        }

        let session = &event.session;
        if self.store.find_order_by_session(&session.id).await?.is_some() {
            info!(session = %session.id, "session already fulfilled");
            return Ok(None);
        }

        let metadata = SessionMetadata::from_map(&session.metadata);
        let summary = if metadata.summary.trim().is_empty() {
            DEFAULT_ORDER_SUMMARY.to_string()
        } else {
            metadata.summary.clone()
        };
        let currency = match session.currency.as_deref() {
            Some(code) => Currency::from_code(code).unwrap_or_else(|| {
                warn!(currency = code, "unknown session currency");
                self.fallback_currency
            }),
            None => self.fallback_currency,
        };
        let total = Money::new(session.amount_total.unwrap_or(0), currency);

        if let Some(configuration_id) = &metadata.configuration_id {
            let record = self.store.get_configuration(configuration_id).await?;
            match self.store.mark_configuration_paid(configuration_id).await {
                Ok(()) => {}
                Err(StoreError::NotFound(_)) => {
                    warn!(
                        configuration = %configuration_id,
                        "paid session references unknown configuration"
                    );
                }
                Err(err) => return Err(err.into()),
            }

            if let Some(product_id) = record.as_ref().and_then(|r| r.options.built_product()) {
                match self.store.decrement_stock(product_id).await {
                    Ok(true) => debug!(product = %product_id, "stock decremented"),
                    Ok(false) => warn!(product = %product_id, "sold a product with no stock left"),
                    Err(StoreError::NotFound(_)) => {
                        warn!(product = %product_id, "sold product no longer exists")
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        let mut order = Order::new(session.id.clone(), summary, total);
        order.configuration_id = metadata.configuration_id.clone();
        order.user_id = metadata.user_id.clone();
        order.customer_email = session.email().map(str::to_string);
        self.store.insert_order(order.clone()).await?;
        info!(
            order_number = %order.order_number,
            total = %order.total,
            "order created"
        );

        if let Some(email) = session.email() {
            self.send_notifications(email, &order).await;
        }

        Ok(Some(order))
    }

    async fn send_notifications(&self, customer_email: &str, order: &Order) {
        let emails = [
            OrderEmail::customer(customer_email, &order.summary, order.total),
            OrderEmail::atelier(self.atelier_email.as_str(), &order.summary, order.total),
        ];
        for email in &emails {
            if let Err(err) = self.notifier.send(email).await {
                warn!(to = %email.to, error = %err, "failed to send order e-mail");
            }
        }
    }

    /// Public lookup by order number; input is trimmed and upper-cased.
    pub async fn track_order(
        &self,
        order_number: &str,
    ) -> Result<OrderTrackingView, FulfillmentError> {
        let order_number = order_number.trim().to_uppercase();
        if order_number.is_empty() {
            return Err(FulfillmentError::MissingOrderNumber);
        }
        let found = self.store.find_order_by_number(&order_number).await?;
        found
            .map(OrderTrackingView::from)
            .ok_or(FulfillmentError::NotFound(order_number))
    }

    pub async fn orders(&self) -> Result<Vec<Order>, FulfillmentError> {
        Ok(self.store.list_orders().await?)
    }

    pub async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), FulfillmentError> {
        self.store.update_order_status(id, status).await?;
        info!(order = %id, status = status.as_str(), "order status updated");
        Ok(())
    }

    /// Attach shipment details, deriving the URL from the carrier when none is given.
    pub async fn update_tracking(
        &self,
        id: &OrderId,
        number: &str,
        carrier: Option<Carrier>,
        manual_url: Option<&str>,
    ) -> Result<Tracking, FulfillmentError> {
        let tracking = Tracking::new(number, carrier, manual_url);
        self.store.update_order_tracking(id, tracking.clone()).await?;
        Ok(tracking)
    }

    pub async fn delete_order(&self, id: &OrderId) -> Result<(), FulfillmentError> {
        self.store.delete_order(id).await?;
        info!(order = %id, "order deleted");
        Ok(())
    }
}
