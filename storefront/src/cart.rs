use crate::error::StoreError;
use crate::model::CartLineItem;
use crate::storage::CartStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Merges incoming line items into a user's cart. Idempotent on product_id:
/// a product never occupies more than one line.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>) -> Self {
        Self { carts }
    }

    /// Read-modify-write of the whole item list. Last writer wins at cart
    /// granularity; concurrent adds for the same user can lose an update
    /// (accepted: carts are single-user, low-contention).
    pub async fn add_to_cart(
        &self,
        user_id: &str,
        item: CartLineItem,
    ) -> Result<Vec<CartLineItem>, StoreError> {
        item.validate()?;

        let mut items = self
            .carts
            .get_items(user_id)
            .await
            .map_err(StoreError::dependency)?;

        match items.iter_mut().find(|line| line.product_id == item.product_id) {
            Some(existing) => {
                // Merge: bump the quantity, keep the stored price and name.
                existing.quantity += item.quantity;
                debug!(
                    "Merged {} more of {} into cart for {}",
                    item.quantity, item.product_id, user_id
                );
            }
            None => {
                items.push(item);
            }
        }

        self.carts
            .put_items(user_id, &items)
            .await
            .map_err(StoreError::dependency)?;

        info!("Cart for {} now holds {} lines", user_id, items.len());
        Ok(items)
    }

    pub async fn get_cart(&self, user_id: &str) -> Result<Vec<CartLineItem>, StoreError> {
        self.carts
            .get_items(user_id)
            .await
            .map_err(StoreError::dependency)
    }
}
