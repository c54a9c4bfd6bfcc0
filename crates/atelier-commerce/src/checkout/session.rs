//! Payment session request handed to the gateway.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CheckoutType;
use crate::i18n::Locale;
use crate::ids::{CheckoutSessionId, ConfigurationId, UserId};
use crate::money::{Currency, Money};

/// Placeholder the gateway replaces with the real session id.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Metadata attached to a session and echoed back by the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub configuration_id: Option<ConfigurationId>,
    pub summary: String,
    pub locale: String,
    pub kind: String,
    pub user_id: Option<UserId>,
}

impl SessionMetadata {
    pub fn new(
        configuration_id: Option<ConfigurationId>,
        summary: impl Into<String>,
        locale: Locale,
        kind: CheckoutType,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            configuration_id,
            summary: summary.into(),
            locale: locale.as_str().to_string(),
            kind: kind.as_str().to_string(),
            user_id,
        }
    }

    /// Flatten to string pairs; absent ids become empty strings.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(
            "configuration_id".to_string(),
            self.configuration_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
        );
        map.insert("summary".to_string(), self.summary.clone());
        map.insert("locale".to_string(), self.locale.clone());
        map.insert("type".to_string(), self.kind.clone());
        map.insert(
            "user_id".to_string(),
            self.user_id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
        );
        map
    }

    /// Read metadata back; empty ids are treated as absent.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).map(|v| v.trim()).unwrap_or("");
        let non_empty = |key: &str| Some(get(key)).filter(|v| !v.is_empty());
        Self {
            configuration_id: non_empty("configuration_id").map(ConfigurationId::new),
            summary: get("summary").to_string(),
            locale: get("locale").to_string(),
            kind: get("type").to_string(),
            user_id: non_empty("user_id").map(UserId::new),
        }
    }
}

/// One priced line on the payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub quantity: u32,
    /// Lowercase ISO code.
    pub currency: String,
    /// Minor units.
    pub unit_amount: i64,
}

/// Everything the gateway needs to open a hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub mode: String,
    pub line_items: Vec<SessionLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
    pub billing_address_required: bool,
    pub allow_promotion_codes: bool,
}

impl CheckoutSessionRequest {
    /// Single-item payment for `amount`, returning to `<site>/<locale>/checkout/...`.
    pub fn payment(
        site_url: &str,
        locale: Locale,
        amount: Money,
        metadata: &SessionMetadata,
    ) -> Self {
        let site_url = site_url.trim_end_matches('/');
        Self {
            mode: "payment".to_string(),
            line_items: vec![SessionLineItem {
                name: metadata.summary.clone(),
                quantity: 1,
                currency: amount.currency.processor_code(),
                unit_amount: amount.amount_cents,
            }],
            success_url: format!(
                "{}/{}/checkout/success?session_id={}",
                site_url, locale, SESSION_ID_PLACEHOLDER
            ),
            cancel_url: format!("{}/{}/checkout/cancel", site_url, locale),
            metadata: metadata.to_map(),
            billing_address_required: true,
            allow_promotion_codes: true,
        }
    }

    /// Currency of the charge, from the first line item.
    pub fn currency(&self) -> Option<Currency> {
        self.line_items
            .first()
            .and_then(|item| Currency::from_code(&item.currency))
    }

    pub fn amount_total(&self) -> i64 {
        self.line_items
            .iter()
            .map(|item| item.unit_amount * i64::from(item.quantity))
            .sum()
    }
}

/// A created session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: CheckoutSessionId,
    /// Hosted payment page to redirect the customer to.
    pub url: String,
}
