//! Orders and the configuration records they are paid against.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Tracking;
use crate::configurator::SubmissionPayload;
use crate::ids::{CheckoutSessionId, ConfigurationId, OrderId, ProductId, UserId};
use crate::money::Money;

/// Prefix of customer-facing order numbers.
pub const ORDER_NUMBER_PREFIX: &str = "CT-";
const ORDER_NUMBER_LEN: usize = 8;
const ORDER_NUMBER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fulfillment status shown in the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Paid, waiting for the atelier. Older records say `paid`.
    #[default]
    #[serde(alias = "paid", alias = "")]
    New,
    Shipped,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::New,
        OrderStatus::Shipped,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Completed => "Completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "new" | "paid" => Some(OrderStatus::New),
            "shipped" => Some(OrderStatus::Shipped),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }
}

/// A paid order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Customer-facing `CT-XXXXXXXX` number.
    pub order_number: String,
    pub configuration_id: Option<ConfigurationId>,
    pub user_id: Option<UserId>,
    pub customer_email: Option<String>,
    pub total: Money,
    pub status: OrderStatus,
    pub summary: String,
    pub checkout_session_id: CheckoutSessionId,
    #[serde(default)]
    pub tracking: Tracking,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// A fresh order in the `new` status.
    pub fn new(
        checkout_session_id: CheckoutSessionId,
        summary: impl Into<String>,
        total: Money,
    ) -> Self {
        Self {
            id: OrderId::generate(),
            order_number: generate_order_number(),
            configuration_id: None,
            user_id: None,
            customer_email: None,
            total,
            status: OrderStatus::New,
            summary: summary.into(),
            checkout_session_id,
            tracking: Tracking::default(),
            created_at: Utc::now(),
        }
    }
}

/// `CT-` followed by eight uppercase letters or digits.
pub fn generate_order_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_NUMBER_LEN)
        .map(|_| ORDER_NUMBER_CHARSET[rng.gen_range(0..ORDER_NUMBER_CHARSET.len())] as char)
        .collect();
    format!("{}{}", ORDER_NUMBER_PREFIX, suffix)
}

/// Payment state of a configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationStatus {
    #[default]
    Pending,
    Paid,
}

/// What a checkout session is paying for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConfigurationOptions {
    /// A configurator build, as re-priced on the server.
    Custom { configuration: SubmissionPayload },
    /// A ready-made watch.
    Built { product_id: ProductId, title: String },
}

impl ConfigurationOptions {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigurationOptions::Custom { .. } => "custom",
            ConfigurationOptions::Built { .. } => "built",
        }
    }

    pub fn built_product(&self) -> Option<&ProductId> {
        match self {
            ConfigurationOptions::Built { product_id, .. } => Some(product_id),
            ConfigurationOptions::Custom { .. } => None,
        }
    }
}

/// Recorded when a checkout session is created; marked paid by the webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub id: ConfigurationId,
    pub options: ConfigurationOptions,
    pub status: ConfigurationStatus,
    pub price: Money,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl ConfigurationRecord {
    pub fn pending(options: ConfigurationOptions, price: Money, user_id: Option<UserId>) -> Self {
        Self {
            id: ConfigurationId::generate(),
            options,
            status: ConfigurationStatus::Pending,
            price,
            user_id,
            created_at: Utc::now(),
        }
    }
}
