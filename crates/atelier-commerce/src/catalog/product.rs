//! Ready-made ("built") watches and admin product validation.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Longest accepted product name.
pub const MAX_NAME_LEN: usize = 200;
/// Longest accepted product id.
pub const MAX_ID_LEN: usize = 100;
/// Highest accepted price, in whole currency units.
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Highest accepted stock level.
pub const MAX_STOCK: i64 = 100_000;
/// Image used when an admin leaves the image blank.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/images/hero-1.svg";

/// A built watch sold as-is from the shop grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Slug-style identifier.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image: String,
    /// Units on hand.
    pub stock: i64,
    /// Inactive products are hidden and cannot be bought.
    pub active: bool,
}

impl Product {
    /// Check if the product can be bought right now.
    pub fn is_purchasable(&self) -> bool {
        self.active && self.stock >= 1
    }

    /// Remove one unit from stock, never going below zero.
    ///
    /// Returns whether a unit was taken.
    pub fn take_one(&mut self) -> bool {
        if self.stock > 0 {
            self.stock -= 1;
            true
        } else {
            false
        }
    }
}

/// Admin create/update payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in whole currency units.
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ProductInput {
    /// Validate the payload and build a product.
    ///
    /// A missing id is derived from the name.
    pub fn into_product(self, currency: Currency) -> Result<Product, CommerceError> {
        let name = self.name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(CommerceError::InvalidProduct("invalid product name".to_string()));
        }
        if !(0.0..=MAX_PRICE).contains(&self.price) {
            return Err(CommerceError::InvalidProduct(
                "price must be between 0 and 1,000,000".to_string(),
            ));
        }
        if !(0..=MAX_STOCK).contains(&self.stock) {
            return Err(CommerceError::InvalidProduct(
                "stock must be between 0 and 100,000".to_string(),
            ));
        }

        let id = match self.id {
            Some(id) => id,
            None => slugify(&name),
        };
        if id.is_empty() || id.len() > MAX_ID_LEN {
            return Err(CommerceError::InvalidProduct("invalid product id".to_string()));
        }

        let image = if self.image.trim().is_empty() {
            DEFAULT_PRODUCT_IMAGE.to_string()
        } else {
            self.image
        };

        Ok(Product {
            id: ProductId::new(id),
            name,
            description: self.description,
            price: Money::from_decimal(self.price, currency),
            image,
            stock: self.stock,
            active: self.active,
        })
    }
}

/// Lowercase, collapse every non-alphanumeric run into `-`, trim dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}
