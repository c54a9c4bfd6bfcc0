//! Guest cart and its items.

use crate::configurator::{PricedConfiguration, SubmissionPayload};
use crate::error::CommerceError;
use crate::ids::{CartId, CartItemId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum quantity allowed per cart item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Product id prefix marking a one-off configurator build.
pub const CUSTOM_PRODUCT_PREFIX: &str = "custom-";

/// An entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// `guest-<uuid>` identifier.
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Set for custom builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<SubmissionPayload>,
}

impl CartItem {
    pub fn is_custom(&self) -> bool {
        self.product_id.as_str().starts_with(CUSTOM_PRODUCT_PREFIX)
    }

    pub fn total(&self) -> Result<Money, CommerceError> {
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// Item data before it gets a cart id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub configuration: Option<SubmissionPayload>,
}

impl NewCartItem {
    /// A built watch from the shop grid.
    pub fn built(
        product_id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id,
            quantity: 1,
            unit_price,
            title: Some(title.into()),
            image_url: Some(image_url.into()),
            configuration: None,
        }
    }

    /// A finished configurator build.
    ///
    /// Each build gets its own `custom-` product id so it never merges.
    pub fn custom(priced: &PricedConfiguration, title: impl Into<String>) -> Self {
        Self {
            product_id: ProductId::new(format!(
                "{}{}",
                CUSTOM_PRODUCT_PREFIX,
                uuid::Uuid::new_v4()
            )),
            quantity: 1,
            unit_price: priced.total,
            title: Some(title.into()),
            image_url: None,
            configuration: Some(SubmissionPayload::from_priced(priced)),
        }
    }
}

/// A guest shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub id: CartId,
    pub items: Vec<CartItem>,
    pub currency: Currency,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    pub fn new(currency: Currency) -> Self {
        let now = current_timestamp();
        Self {
            id: CartId::generate(),
            items: Vec::new(),
            currency,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add an item, merging built watches with an identical entry.
    ///
    /// Custom builds always get a new entry.
    pub fn add_item(&mut self, item: NewCartItem) -> Result<CartItemId, CommerceError> {
        if item.quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(item.quantity));
        }
        if item.unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: item.unit_price.currency.code().to_string(),
            });
        }

        let is_custom = item.product_id.as_str().starts_with(CUSTOM_PRODUCT_PREFIX);
        if !is_custom {
            if let Some(existing) = self.items.iter_mut().find(|i| {
                i.product_id == item.product_id && i.configuration == item.configuration
            }) {
                let quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(CommerceError::Overflow)?;
                if quantity > MAX_QUANTITY_PER_ITEM {
                    return Err(CommerceError::QuantityExceedsLimit(
                        quantity,
                        MAX_QUANTITY_PER_ITEM,
                    ));
                }
                existing.quantity = quantity;
                self.updated_at = current_timestamp();
                debug!(item = %existing.id, quantity, "merged cart item");
                return Ok(existing.id.clone());
            }
        }

        if item.quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                item.quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let id = CartItemId::generate();
        self.items.push(CartItem {
            id: id.clone(),
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            title: item.title,
            image_url: item.image_url,
            configuration: item.configuration,
        });
        self.updated_at = current_timestamp();
        debug!(item = %id, "added cart item");
        Ok(id)
    }

    /// Set an item's quantity. Anything below 1 removes it.
    pub fn update_quantity(&mut self, id: &CartItemId, quantity: i64) -> Result<(), CommerceError> {
        if quantity < 1 {
            return self.remove_item(id);
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| CommerceError::ItemNotInCart(id.to_string()))?;
        item.quantity = quantity;
        self.updated_at = current_timestamp();
        Ok(())
    }

    pub fn remove_item(&mut self, id: &CartItemId) -> Result<(), CommerceError> {
        let before = self.items.len();
        self.items.retain(|i| &i.id != id);
        if self.items.len() == before {
            return Err(CommerceError::ItemNotInCart(id.to_string()));
        }
        self.updated_at = current_timestamp();
        Ok(())
    }

    pub fn get_item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Total number of units, as shown on the cart badge.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        self.items.iter().try_fold(Money::zero(self.currency), |acc, item| {
            acc.try_add(&item.total()?).ok_or(CommerceError::Overflow)
        })
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = current_timestamp();
    }
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
