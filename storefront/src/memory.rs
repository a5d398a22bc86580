//! In-memory store implementations. They back the test suites and local
//! runs that have no Postgres at hand; semantics mirror the SeaORM
//! implementations (full-overwrite puts, append-only ledger, scans).

use crate::model::{CartLineItem, InventoryRecord, Order, OrderStatus, Product};
use crate::storage::{CartStore, CatalogStore, InventoryStore, OrderStore, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryCatalogStore {
    products: Arc<Mutex<BTreeMap<String, Product>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn put_product(&self, product: &Product) -> Result<(), StorageError> {
        let mut products = self.products.lock().await;
        products.insert(product.product_id.clone(), product.clone());
        Ok(())
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, StorageError> {
        let products = self.products.lock().await;
        Ok(products.get(product_id).cloned())
    }

    async fn find_by_name(&self, item_name: &str) -> Result<Option<Product>, StorageError> {
        let products = self.products.lock().await;
        Ok(products
            .values()
            .find(|p| p.item_name.contains(item_name))
            .cloned())
    }

    async fn scan_products(&self) -> Result<Vec<Product>, StorageError> {
        let products = self.products.lock().await;
        Ok(products.values().cloned().collect())
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), StorageError> {
        let mut products = self.products.lock().await;
        products.remove(product_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCartStore {
    carts: Arc<Mutex<BTreeMap<String, Vec<CartLineItem>>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get_items(&self, user_id: &str) -> Result<Vec<CartLineItem>, StorageError> {
        let carts = self.carts.lock().await;
        Ok(carts.get(user_id).cloned().unwrap_or_default())
    }

    async fn put_items(&self, user_id: &str, items: &[CartLineItem]) -> Result<(), StorageError> {
        let mut carts = self.carts.lock().await;
        carts.insert(user_id.to_string(), items.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Arc<Mutex<BTreeMap<String, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn put_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut orders = self.orders.lock().await;
        orders.insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, StorageError> {
        let orders = self.orders.lock().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn orders_for_customer(&self, customer_name: &str) -> Result<Vec<Order>, StorageError> {
        let orders = self.orders.lock().await;
        Ok(orders
            .values()
            .filter(|o| o.customer_name == customer_name)
            .cloned()
            .collect())
    }

    async fn scan_orders(&self) -> Result<Vec<Order>, StorageError> {
        let orders = self.orders.lock().await;
        Ok(orders.values().cloned().collect())
    }

    async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), StorageError> {
        let mut orders = self.orders.lock().await;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| format!("order not found for id: {}", order_id))?;
        order.status = status;
        Ok(())
    }
}

/// Ledger rows in insertion order. `failing_after` makes the nth append
/// fail, which is how the checkout failure-policy tests force a mid-loop
/// abort.
#[derive(Default)]
pub struct InMemoryInventoryStore {
    records: Arc<Mutex<Vec<InventoryRecord>>>,
    appends: AtomicUsize,
    fail_after: Option<usize>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed for the first `n` appends, then fail every later one.
    pub fn failing_after(n: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            appends: AtomicUsize::new(0),
            fail_after: Some(n),
        }
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn append_record(&self, record: &InventoryRecord) -> Result<(), StorageError> {
        let n = self.appends.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_after {
            if n >= limit {
                return Err("simulated inventory store failure".into());
            }
        }
        let mut records = self.records.lock().await;
        records.push(record.clone());
        Ok(())
    }

    async fn records_for_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<InventoryRecord>, StorageError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn scan_records(&self) -> Result<Vec<InventoryRecord>, StorageError> {
        let records = self.records.lock().await;
        Ok(records.clone())
    }
}
