use crate::model::{CartLineItem, InventoryRecord, Order, OrderStatus, Product};
use async_trait::async_trait;
use std::error::Error;

/// Raw error type every store implementation reports. Services convert these
/// to `StoreError::Dependency` at the operation boundary.
pub type StorageError = Box<dyn Error + Send + Sync>;

/// Product catalog: product_id -> attributes, full put on write.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn put_product(&self, product: &Product) -> Result<(), StorageError>;

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, StorageError>;

    /// Filtered scan by display name.
    async fn find_by_name(&self, item_name: &str) -> Result<Option<Product>, StorageError>;

    async fn scan_products(&self) -> Result<Vec<Product>, StorageError>;

    async fn delete_product(&self, product_id: &str) -> Result<(), StorageError>;
}

/// Cart store: user_id -> ordered line items. The whole list is overwritten
/// on every write; there is no per-line operation.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Missing carts read as an empty list; carts are created lazily on the
    /// first put.
    async fn get_items(&self, user_id: &str) -> Result<Vec<CartLineItem>, StorageError>;

    async fn put_items(&self, user_id: &str, items: &[CartLineItem]) -> Result<(), StorageError>;
}

/// Order store: order_id -> immutable snapshot plus a mutable status field.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn put_order(&self, order: &Order) -> Result<(), StorageError>;

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, StorageError>;

    /// Query by the customer_name index.
    async fn orders_for_customer(&self, customer_name: &str) -> Result<Vec<Order>, StorageError>;

    /// Unbounded scan.
    async fn scan_orders(&self) -> Result<Vec<Order>, StorageError>;

    /// Overwrites only the status field.
    async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), StorageError>;
}

/// Append-only inventory ledger keyed by (product_id, timestamp).
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn append_record(&self, record: &InventoryRecord) -> Result<(), StorageError>;

    async fn records_for_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<InventoryRecord>, StorageError>;

    /// Unbounded scan.
    async fn scan_records(&self) -> Result<Vec<InventoryRecord>, StorageError>;
}
