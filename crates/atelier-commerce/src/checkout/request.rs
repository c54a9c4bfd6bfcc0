//! Checkout request as posted by the storefront.

use serde::{Deserialize, Serialize};

use crate::configurator::SubmissionPayload;
use crate::i18n::Locale;
use crate::ids::{ProductId, UserId};

/// What is being bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutType {
    Custom,
    Built,
}

impl CheckoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutType::Custom => "custom",
            CheckoutType::Built => "built",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "custom" => Some(CheckoutType::Custom),
            "built" => Some(CheckoutType::Built),
            _ => None,
        }
    }
}

/// Body of a checkout request.
///
/// `kind` stays a raw string so an unknown type can be reported instead of
/// failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub locale: Locale,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<SubmissionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
}

impl CheckoutRequest {
    pub fn custom(
        locale: Locale,
        user_id: Option<UserId>,
        configuration: SubmissionPayload,
    ) -> Self {
        Self {
            locale,
            kind: CheckoutType::Custom.as_str().to_string(),
            user_id,
            configuration: Some(configuration),
            product_id: None,
        }
    }

    pub fn built(locale: Locale, user_id: Option<UserId>, product_id: ProductId) -> Self {
        Self {
            locale,
            kind: CheckoutType::Built.as_str().to_string(),
            user_id,
            configuration: None,
            product_id: Some(product_id),
        }
    }

    pub fn checkout_type(&self) -> Option<CheckoutType> {
        CheckoutType::from_str(&self.kind)
    }
}
