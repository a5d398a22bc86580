use crate::error::StoreError;
use crate::model::{
    local_timestamp, next_order_id, InventoryRecord, Order, OrderStatus,
};
use crate::object_store::ObjectStore;
use crate::storage::{CartStore, InventoryStore, OrderStore};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{error, info, warn};

const PURCHASE_REMARK: &str = "Purchased item!";

/// Cart-to-order transition: reads the cart, writes negative ledger deltas,
/// persists the order snapshot, clears the cart. The writes are sequential,
/// not transactional - see the failure notes on each operation.
#[derive(Clone)]
pub struct OrderService {
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    inventory: Arc<dyn InventoryStore>,
    objects: Arc<dyn ObjectStore>,
}

impl OrderService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        inventory: Arc<dyn InventoryStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            carts,
            orders,
            inventory,
            objects,
        }
    }

    /// Cart-clearing checkout. One negative ledger record per line, then the
    /// cart is overwritten with an empty list.
    ///
    /// If a ledger write fails mid-loop the call aborts: records already
    /// written stay written (no rollback) and the cart is NOT cleared.
    /// Callers must be able to detect and reconcile that window.
    pub async fn checkout(&self, user_id: &str) -> Result<(), StoreError> {
        let items = self
            .carts
            .get_items(user_id)
            .await
            .map_err(StoreError::dependency)?;
        if items.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        for line in &items {
            let record = InventoryRecord {
                product_id: line.product_id.clone(),
                quantity: -line.quantity,
                remark: PURCHASE_REMARK.to_string(),
                recorded_at: local_timestamp(),
            };
            if let Err(e) = self.inventory.append_record(&record).await {
                error!(
                    "Checkout for {} aborted on {}: {}; earlier deductions stand, cart kept",
                    user_id, line.product_id, e
                );
                return Err(StoreError::dependency(e));
            }
        }

        self.carts
            .put_items(user_id, &[])
            .await
            .map_err(StoreError::dependency)?;

        info!("Checked out {} lines for {}", items.len(), user_id);
        Ok(())
    }

    /// Order-creating checkout. Persists the order snapshot first, then the
    /// ledger deductions, then clears the cart - sequentially. A failure
    /// between the steps leaves the order valid with a non-empty cart
    /// (duplicate-fulfillment risk, documented behavior).
    pub async fn place_order(&self, user_id: &str) -> Result<String, StoreError> {
        let items = self
            .carts
            .get_items(user_id)
            .await
            .map_err(StoreError::dependency)?;
        if items.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let order_id = next_order_id();
        let order = Order {
            order_id: order_id.clone(),
            customer_name: user_id.to_string(),
            items: items.clone(),
            status: OrderStatus::Preparing,
            order_datetime: local_timestamp(),
        };

        self.orders
            .put_order(&order)
            .await
            .map_err(StoreError::dependency)?;

        for line in &items {
            let record = InventoryRecord {
                product_id: line.product_id.clone(),
                quantity: -line.quantity,
                remark: format!("Purchased in order {}", order_id),
                recorded_at: local_timestamp(),
            };
            if let Err(e) = self.inventory.append_record(&record).await {
                warn!(
                    "Order {} persisted but deduction for {} failed: {}; cart kept",
                    order_id, line.product_id, e
                );
                return Err(StoreError::dependency(e));
            }
        }

        self.carts
            .put_items(user_id, &[])
            .await
            .map_err(StoreError::dependency)?;

        info!("Placed order {} for {}", order_id, user_id);
        Ok(order_id)
    }

    pub async fn get_orders(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
        self.orders
            .orders_for_customer(user_id)
            .await
            .map_err(StoreError::dependency)
    }

    /// Unbounded scan - acceptable only at small scale.
    pub async fn get_all_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.orders
            .scan_orders()
            .await
            .map_err(StoreError::dependency)
    }

    /// Fetches the order, enforcing existence then ownership.
    async fn authorized_order(
        &self,
        order_id: &str,
        customer_name: &str,
    ) -> Result<Order, StoreError> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(StoreError::dependency)?
            .ok_or_else(|| StoreError::NotFound(format!("order {}", order_id)))?;

        if order.customer_name != customer_name {
            return Err(StoreError::Authorization(format!(
                "order {} does not belong to {}",
                order_id, customer_name
            )));
        }
        Ok(order)
    }

    /// Overwrites only the status field and returns the new value.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        customer_name: &str,
        new_status: OrderStatus,
    ) -> Result<OrderStatus, StoreError> {
        self.authorized_order(order_id, customer_name).await?;

        self.orders
            .set_status(order_id, new_status)
            .await
            .map_err(StoreError::dependency)?;

        info!("Order {} status set to {}", order_id, new_status);
        Ok(new_status)
    }

    /// Renders the plain-text receipt, stores it under a key derived from
    /// the order id, and returns the public URL.
    pub async fn generate_receipt(
        &self,
        order_id: &str,
        customer_name: &str,
    ) -> Result<String, StoreError> {
        let order = self.authorized_order(order_id, customer_name).await?;

        let receipt = render_receipt(&order);
        let key = receipt_key(order_id);
        let url = self
            .objects
            .put_object(&key, receipt.as_bytes(), "text/plain")
            .await
            .map_err(StoreError::dependency)?;

        info!("Receipt for {} stored at {}", order_id, key);
        Ok(url)
    }
}

pub fn receipt_key(order_id: &str) -> String {
    format!("receipts/{}.txt", order_id)
}

fn render_receipt(order: &Order) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order: {}", order.order_id);
    let _ = writeln!(out, "Customer: {}", order.customer_name);
    let _ = writeln!(
        out,
        "Date: {}",
        order.order_datetime.format(crate::model::datetime_format::FORMAT)
    );
    let _ = writeln!(out, "Status: {}", order.status);
    let _ = writeln!(out);
    for line in &order.items {
        let _ = writeln!(
            out,
            "{}x {} @ {} each",
            line.quantity, line.item_name, line.price
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Items: {}", order.items.len());
    out
}
