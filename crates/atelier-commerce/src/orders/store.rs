//! Persistence boundary for configurations, products and orders.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{ConfigurationRecord, ConfigurationStatus, Order, OrderStatus, Tracking};
use crate::catalog::Product;
use crate::ids::{CheckoutSessionId, ConfigurationId, OrderId, ProductId};

/// Store operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Backing storage used by checkout and fulfillment.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_configuration(&self, record: ConfigurationRecord) -> StoreResult<()>;

    async fn get_configuration(
        &self,
        id: &ConfigurationId,
    ) -> StoreResult<Option<ConfigurationRecord>>;

    async fn mark_configuration_paid(&self, id: &ConfigurationId) -> StoreResult<()>;

    async fn get_product(&self, id: &ProductId) -> StoreResult<Option<Product>>;

    /// Create or replace a product.
    async fn upsert_product(&self, product: Product) -> StoreResult<()>;

    /// Active and inactive products, ordered by name.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Take one unit from stock. Returns false when stock was already zero.
    async fn decrement_stock(&self, id: &ProductId) -> StoreResult<bool>;

    async fn insert_order(&self, order: Order) -> StoreResult<()>;

    async fn find_order_by_number(&self, order_number: &str) -> StoreResult<Option<Order>>;

    async fn find_order_by_session(
        &self,
        session_id: &CheckoutSessionId,
    ) -> StoreResult<Option<Order>>;

    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> StoreResult<()>;

    async fn update_order_tracking(&self, id: &OrderId, tracking: Tracking) -> StoreResult<()>;

    async fn delete_order(&self, id: &OrderId) -> StoreResult<()>;

    /// All orders, newest first.
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;
}

#[derive(Debug, Default)]
struct Tables {
    configurations: HashMap<ConfigurationId, ConfigurationRecord>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
}

/// In-memory store for tests and the CLI.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let tables = Tables {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_configuration(&self, record: ConfigurationRecord) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.configurations.contains_key(&record.id) {
            return Err(StoreError::Conflict(record.id.to_string()));
        }
        tables.configurations.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_configuration(
        &self,
        id: &ConfigurationId,
    ) -> StoreResult<Option<ConfigurationRecord>> {
        Ok(self.tables.read().await.configurations.get(id).cloned())
    }

    async fn mark_configuration_paid(&self, id: &ConfigurationId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let record = tables
            .configurations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.status = ConfigurationStatus::Paid;
        Ok(())
    }

    async fn get_product(&self, id: &ProductId) -> StoreResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(id).cloned())
    }

    async fn upsert_product(&self, product: Product) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .products
            .insert(product.id.clone(), product);
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let mut products: Vec<Product> =
            self.tables.read().await.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn decrement_stock(&self, id: &ProductId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(product.take_one())
    }

    async fn insert_order(&self, order: Order) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.orders.contains_key(&order.id)
            || tables
                .orders
                .values()
                .any(|o| o.order_number == order.order_number)
        {
            return Err(StoreError::Conflict(order.order_number));
        }
        tables.orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn find_order_by_number(&self, order_number: &str) -> StoreResult<Option<Order>> {
        Ok(self
            .tables
            .read()
            .await
            .orders
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn find_order_by_session(
        &self,
        session_id: &CheckoutSessionId,
    ) -> StoreResult<Option<Order>> {
        Ok(self
            .tables
            .read()
            .await
            .orders
            .values()
            .find(|o| &o.checkout_session_id == session_id)
            .cloned())
    }

    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        order.status = status;
        Ok(())
    }

    async fn update_order_tracking(&self, id: &OrderId, tracking: Tracking) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        order.tracking = tracking;
        Ok(())
    }

    async fn delete_order(&self, id: &OrderId) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .orders
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self.tables.read().await.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};
    use crate::orders::ConfigurationOptions;

    fn product(stock: i64) -> Product {
        Product {
            id: ProductId::new("heritage-36"),
            name: "Heritage 36".to_string(),
            description: String::new(),
            price: Money::new(420_000, Currency::USD),
            image: "/images/hero-1.svg".to_string(),
            stock,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_decrement_stock_stops_at_zero() {
        let store = InMemoryStore::with_products([product(1)]);
        let id = ProductId::new("heritage-36");

        assert!(store.decrement_stock(&id).await.unwrap());
        assert!(!store.decrement_stock(&id).await.unwrap());
        assert_eq!(store.get_product(&id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_configuration_lifecycle() {
        let store = InMemoryStore::new();
        let record = ConfigurationRecord::pending(
            ConfigurationOptions::Built {
                product_id: ProductId::new("heritage-36"),
                title: "Heritage 36".to_string(),
            },
            Money::new(420_000, Currency::USD),
            None,
        );
        let id = record.id.clone();
        store.insert_configuration(record.clone()).await.unwrap();
        assert!(matches!(
            store.insert_configuration(record).await,
            Err(StoreError::Conflict(_))
        ));

        store.mark_configuration_paid(&id).await.unwrap();
        let stored = store.get_configuration(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, ConfigurationStatus::Paid);
    }

    #[tokio::test]
    async fn test_orders_listed_newest_first() {
        let store = InMemoryStore::new();
        let mut older = Order::new(
            CheckoutSessionId::new("cs_1"),
            "first",
            Money::zero(Currency::USD),
        );
        older.created_at = older.created_at - chrono::Duration::hours(1);
        let newer = Order::new(
            CheckoutSessionId::new("cs_2"),
            "second",
            Money::zero(Currency::USD),
        );
        store.insert_order(older).await.unwrap();
        store.insert_order(newer).await.unwrap();

        let summaries: Vec<String> = store
            .list_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.summary)
            .collect();
        assert_eq!(summaries, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_missing_order_updates_fail() {
        let store = InMemoryStore::new();
        let id = OrderId::new("order-missing");
        assert!(matches!(
            store.update_order_status(&id, OrderStatus::Shipped).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete_order(&id).await, Err(StoreError::NotFound(_))));
    }
}
