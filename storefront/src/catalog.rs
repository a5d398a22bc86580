use crate::error::StoreError;
use crate::model::{Product, ProductUpdate};
use crate::queue::{EventBus, MessageQueue};
use crate::storage::{CartStore, CatalogStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

const CREATE_PRODUCT_EVENT: &str = "create_product";

/// A product view enriched with the quantity the requesting user already
/// has in their cart.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub in_user_cart: i64,
}

/// Catalog admin operations plus the cart-aware product view.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
    queue: Arc<dyn MessageQueue>,
    events: Arc<dyn EventBus>,
    event_source: String,
}

impl CatalogService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        carts: Arc<dyn CartStore>,
        queue: Arc<dyn MessageQueue>,
        events: Arc<dyn EventBus>,
        event_source: String,
    ) -> Self {
        Self {
            catalog,
            carts,
            queue,
            events,
            event_source,
        }
    }

    /// Saves the product, then notifies the product queue, then publishes
    /// the creation event. A queue failure surfaces as a dependency error
    /// but the saved product stays saved; event publish failures are only
    /// logged.
    pub async fn create_product(&self, product: Product) -> Result<Product, StoreError> {
        product.validate()?;
        info!("Creating product {}", product.product_id);

        self.catalog
            .put_product(&product)
            .await
            .map_err(StoreError::dependency)?;

        let payload = serde_json::to_value(&product)
            .map_err(|e| StoreError::Dependency(e.to_string()))?;
        self.queue
            .send(&payload)
            .await
            .map_err(StoreError::dependency)?;

        if let Err(e) = self
            .events
            .publish(&self.event_source, CREATE_PRODUCT_EVENT, &payload)
            .await
        {
            warn!("Product creation event for {} not published: {}", product.product_id, e);
        }

        Ok(product)
    }

    /// Unbounded scan - acceptable only at small scale.
    pub async fn get_all_products(&self) -> Result<Vec<Product>, StoreError> {
        self.catalog
            .scan_products()
            .await
            .map_err(StoreError::dependency)
    }

    pub async fn view_product(&self, product_id: &str) -> Result<Product, StoreError> {
        if product_id.trim().is_empty() {
            return Err(StoreError::Validation("missing product_id".to_string()));
        }
        self.catalog
            .get_product(product_id)
            .await
            .map_err(StoreError::dependency)?
            .ok_or_else(|| StoreError::NotFound(format!("product {}", product_id)))
    }

    pub async fn find_product_by_name(&self, item_name: &str) -> Result<Product, StoreError> {
        if item_name.trim().is_empty() {
            return Err(StoreError::Validation("missing item name".to_string()));
        }
        self.catalog
            .find_by_name(item_name)
            .await
            .map_err(StoreError::dependency)?
            .ok_or_else(|| StoreError::NotFound(format!("product named {:?}", item_name)))
    }

    /// The product view plus how many of it the user already carts (0 when
    /// absent).
    pub async fn view_product_for_user(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<ProductView, StoreError> {
        let product = self.view_product(product_id).await?;
        let items = self
            .carts
            .get_items(user_id)
            .await
            .map_err(StoreError::dependency)?;
        let in_user_cart = items
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
            .unwrap_or(0);

        Ok(ProductView {
            product,
            in_user_cart,
        })
    }

    /// Applies a whitelisted field update. Unknown attributes never reach
    /// the store; an update naming no fields is rejected.
    pub async fn edit_product(
        &self,
        product_id: &str,
        update: ProductUpdate,
    ) -> Result<Product, StoreError> {
        update.validate()?;
        let mut product = self.view_product(product_id).await?;
        update.apply_to(&mut product);

        self.catalog
            .put_product(&product)
            .await
            .map_err(StoreError::dependency)?;

        info!("Updated product {}", product_id);
        Ok(product)
    }

    /// Unconditional delete: no cascade check against orders or the ledger.
    pub async fn delete_product(&self, product_id: &str) -> Result<(), StoreError> {
        if product_id.trim().is_empty() {
            return Err(StoreError::Validation("missing product_id".to_string()));
        }
        self.catalog
            .delete_product(product_id)
            .await
            .map_err(StoreError::dependency)?;
        info!("Deleted product {}", product_id);
        Ok(())
    }
}
