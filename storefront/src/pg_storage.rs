use crate::model::{CartLineItem, InventoryRecord, Order, OrderStatus, Product};
use crate::storage::{CartStore, CatalogStore, InventoryStore, OrderStore, StorageError};
use crate::storage_model::{cart, inventory_movement, order, product};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// SeaORM-backed implementation of every store trait. One connection handle
/// serves all tables; the process entry point owns it and hands out
/// `Arc<PgStorage>` clones as the individual trait objects.
#[derive(Clone)]
pub struct PgStorage {
    pub db: DatabaseConnection,
}

impl PgStorage {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        info!("Connecting to storefront database");
        // Every store call fails fast instead of waiting on a dead database.
        let mut options = ConnectOptions::new(database_url.to_string());
        options
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(5));
        let db = Database::connect(options).await?;
        Ok(Self { db })
    }

    /// Apply the workspace SQL migrations. Safe to run on every startup.
    pub async fn run_migrations(&self, migrations_dir: &Path) -> Result<(), StorageError> {
        info!("Running migrations from {:?}", migrations_dir);
        sqlx::migrate::Migrator::new(migrations_dir.to_path_buf())
            .await?
            .run(self.db.get_postgres_connection_pool())
            .await?;
        Ok(())
    }
}

fn product_to_row(p: &Product) -> product::ActiveModel {
    product::ActiveModel {
        product_id: Set(p.product_id.clone()),
        item_name: Set(p.item_name.clone()),
        description: Set(p.description.clone()),
        price: Set(p.price.clone()),
        brand: Set(p.brand.clone()),
        category: Set(p.category.clone()),
    }
}

fn product_from_row(row: product::Model) -> Product {
    Product {
        product_id: row.product_id,
        item_name: row.item_name,
        description: row.description,
        price: row.price,
        brand: row.brand,
        category: row.category,
    }
}

fn order_from_row(row: order::Model) -> Result<Order, StorageError> {
    let items: Vec<CartLineItem> = serde_json::from_value(row.items)?;
    let status: OrderStatus = row
        .status
        .parse()
        .map_err(|_| format!("unknown order status in store: {}", row.status))?;
    Ok(Order {
        order_id: row.order_id,
        customer_name: row.customer_name,
        items,
        status,
        order_datetime: row.order_datetime,
    })
}

#[async_trait]
impl CatalogStore for PgStorage {
    async fn put_product(&self, p: &Product) -> Result<(), StorageError> {
        debug!("Putting product {}", p.product_id);
        let row = product_to_row(p);
        match product::Entity::find_by_id(p.product_id.clone())
            .one(&self.db)
            .await?
        {
            Some(_) => {
                row.update(&self.db).await?;
            }
            None => {
                row.insert(&self.db).await?;
            }
        }
        Ok(())
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, StorageError> {
        let row = product::Entity::find_by_id(product_id.to_string())
            .one(&self.db)
            .await?;
        Ok(row.map(product_from_row))
    }

    async fn find_by_name(&self, item_name: &str) -> Result<Option<Product>, StorageError> {
        let row = product::Entity::find()
            .filter(product::Column::ItemName.contains(item_name))
            .one(&self.db)
            .await?;
        Ok(row.map(product_from_row))
    }

    async fn scan_products(&self) -> Result<Vec<Product>, StorageError> {
        let rows = product::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(product_from_row).collect())
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), StorageError> {
        product::Entity::delete_by_id(product_id.to_string())
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for PgStorage {
    async fn get_items(&self, user_id: &str) -> Result<Vec<CartLineItem>, StorageError> {
        let row = cart::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?;
        match row {
            Some(row) => Ok(serde_json::from_value(row.items)?),
            None => Ok(Vec::new()),
        }
    }

    async fn put_items(&self, user_id: &str, items: &[CartLineItem]) -> Result<(), StorageError> {
        debug!("Writing {} cart lines for user {}", items.len(), user_id);
        let row = cart::ActiveModel {
            user_id: Set(user_id.to_string()),
            items: Set(serde_json::to_value(items)?),
        };
        match cart::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?
        {
            Some(_) => {
                row.update(&self.db).await?;
            }
            None => {
                row.insert(&self.db).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgStorage {
    async fn put_order(&self, o: &Order) -> Result<(), StorageError> {
        debug!("Persisting order {}", o.order_id);
        let row = order::ActiveModel {
            order_id: Set(o.order_id.clone()),
            customer_name: Set(o.customer_name.clone()),
            items: Set(serde_json::to_value(&o.items)?),
            status: Set(o.status.to_string()),
            order_datetime: Set(o.order_datetime),
        };
        row.insert(&self.db).await?;
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, StorageError> {
        let row = order::Entity::find_by_id(order_id.to_string())
            .one(&self.db)
            .await?;
        row.map(order_from_row).transpose()
    }

    async fn orders_for_customer(&self, customer_name: &str) -> Result<Vec<Order>, StorageError> {
        let rows = order::Entity::find()
            .filter(order::Column::CustomerName.eq(customer_name))
            .order_by_asc(order::Column::OrderDatetime)
            .all(&self.db)
            .await?;
        rows.into_iter().map(order_from_row).collect()
    }

    async fn scan_orders(&self) -> Result<Vec<Order>, StorageError> {
        let rows = order::Entity::find().all(&self.db).await?;
        rows.into_iter().map(order_from_row).collect()
    }

    async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), StorageError> {
        let mut row: order::ActiveModel = order::Entity::find_by_id(order_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| format!("order not found for id: {}", order_id))?
            .into();

        row.status = Set(status.to_string());
        row.update(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PgStorage {
    async fn append_record(&self, record: &InventoryRecord) -> Result<(), StorageError> {
        let row = inventory_movement::ActiveModel {
            product_id: Set(record.product_id.clone()),
            recorded_at: Set(record.recorded_at),
            quantity: Set(record.quantity),
            remark: Set(record.remark.clone()),
        };
        row.insert(&self.db).await?;
        Ok(())
    }

    async fn records_for_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<InventoryRecord>, StorageError> {
        let rows = inventory_movement::Entity::find()
            .filter(inventory_movement::Column::ProductId.eq(product_id))
            .order_by_asc(inventory_movement::Column::RecordedAt)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| InventoryRecord {
                product_id: row.product_id,
                quantity: row.quantity,
                remark: row.remark,
                recorded_at: row.recorded_at,
            })
            .collect())
    }

    async fn scan_records(&self) -> Result<Vec<InventoryRecord>, StorageError> {
        let rows = inventory_movement::Entity::find().all(&self.db).await?;
        Ok(rows
            .into_iter()
            .map(|row| InventoryRecord {
                product_id: row.product_id,
                quantity: row.quantity,
                remark: row.remark,
                recorded_at: row.recorded_at,
            })
            .collect())
    }
}
