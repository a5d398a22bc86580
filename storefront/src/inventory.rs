use crate::error::StoreError;
use crate::model::{local_timestamp, InventoryRecord, ProductInventory};
use crate::storage::{CatalogStore, InventoryStore};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

const DEFAULT_REMARK: &str = "Default remark.";

/// Stock-in request. The quantity is a signed delta; remark falls back to a
/// fixed default when the caller supplies none.
#[derive(Debug, Clone, Deserialize)]
pub struct AddInventoryRequest {
    #[serde(default)]
    pub product_id: String,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Read side of the inventory ledger. Current stock is the sum over all
/// deltas, recomputed on every read - there is no cached running total.
#[derive(Clone)]
pub struct InventoryService {
    catalog: Arc<dyn CatalogStore>,
    inventory: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(catalog: Arc<dyn CatalogStore>, inventory: Arc<dyn InventoryStore>) -> Self {
        Self { catalog, inventory }
    }

    pub async fn get_product_inventory(
        &self,
        product_id: &str,
    ) -> Result<ProductInventory, StoreError> {
        self.catalog
            .get_product(product_id)
            .await
            .map_err(StoreError::dependency)?
            .ok_or_else(|| StoreError::NotFound(format!("product {}", product_id)))?;

        let records = self
            .inventory
            .records_for_product(product_id)
            .await
            .map_err(StoreError::dependency)?;

        let total_quantity: i64 = records.iter().map(|r| r.quantity).sum();
        Ok(ProductInventory {
            product_id: product_id.to_string(),
            total_quantity,
        })
    }

    pub async fn add_inventory(&self, request: AddInventoryRequest) -> Result<(), StoreError> {
        if request.product_id.trim().is_empty() {
            return Err(StoreError::Validation(
                "missing product_id or quantity".to_string(),
            ));
        }
        let quantity = request.quantity.ok_or_else(|| {
            StoreError::Validation("missing product_id or quantity".to_string())
        })?;

        self.catalog
            .get_product(&request.product_id)
            .await
            .map_err(StoreError::dependency)?
            .ok_or_else(|| StoreError::NotFound(format!("product {}", request.product_id)))?;

        let record = InventoryRecord {
            product_id: request.product_id.clone(),
            quantity,
            remark: request
                .remark
                .unwrap_or_else(|| DEFAULT_REMARK.to_string()),
            recorded_at: local_timestamp(),
        };
        self.inventory
            .append_record(&record)
            .await
            .map_err(StoreError::dependency)?;

        info!(
            "Recorded inventory delta {} for {}",
            quantity, request.product_id
        );
        Ok(())
    }

    /// Unbounded scan - acceptable only at small scale.
    pub async fn get_all_inventory(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        self.inventory
            .scan_records()
            .await
            .map_err(StoreError::dependency)
    }
}
