use chrono::{NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::StoreError;

/// Ledger and order timestamps carry second precision in local time,
/// rendered as "YYYY-MM-DD HH:MM:SS".
pub mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Current local time truncated to second precision, the resolution the
/// inventory ledger sort key carries.
pub fn local_timestamp() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Parse a price string into an exact decimal. Money never goes through
/// floating point.
pub fn parse_price(price: &str) -> Result<Decimal, StoreError> {
    price
        .trim()
        .parse::<Decimal>()
        .map_err(|_| StoreError::Validation(format!("invalid price: {:?}", price)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal-as-string, e.g. "10.00".
    pub price: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
}

impl Product {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.product_id.trim().is_empty() {
            return Err(StoreError::Validation(
                "missing product_id".to_string(),
            ));
        }
        parse_price(&self.price)?;
        Ok(())
    }
}

/// Typed field-update builder for products. Only the fields named here can
/// be edited; unknown attribute names never reach the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.item_name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.brand.is_none()
            && self.category.is_none()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.is_empty() {
            return Err(StoreError::Validation(
                "update names no editable fields".to_string(),
            ));
        }
        if let Some(price) = &self.price {
            parse_price(price)?;
        }
        Ok(())
    }

    /// Overwrite only the supplied fields.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(item_name) = &self.item_name {
            product.item_name = item_name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = &self.price {
            product.price = price.clone();
        }
        if let Some(brand) = &self.brand {
            product.brand = brand.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
    }
}

/// One line of a cart. Lives inside a Cart, never addressed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: String,
    pub quantity: i64,
    pub price: String,
    pub item_name: String,
}

impl CartLineItem {
    /// Positive integer quantity and a parseable decimal price, otherwise
    /// the line never enters a cart.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.product_id.trim().is_empty() {
            return Err(StoreError::Validation("missing product_id".to_string()));
        }
        if self.quantity < 1 {
            return Err(StoreError::Validation(format!(
                "quantity must be a positive integer, got {}",
                self.quantity
            )));
        }
        parse_price(&self.price)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartLineItem>,
}

/// Append-only ledger row. Positive quantity = stock-in, negative =
/// stock-out/purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: String,
    pub quantity: i64,
    pub remark: String,
    #[serde(with = "datetime_format")]
    pub recorded_at: NaiveDateTime,
}

/// Current stock for one product, recomputed from the ledger on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInventory {
    pub product_id: String,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum OrderStatus {
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_name: String,
    /// Snapshot copy of the cart at checkout time. Mutating the cart after
    /// checkout never affects a placed order.
    pub items: Vec<CartLineItem>,
    pub status: OrderStatus,
    #[serde(with = "datetime_format")]
    pub order_datetime: NaiveDateTime,
}

/// New order ids keep the "ORD-{unix seconds}" shape downstream systems may
/// key on, with a random suffix so concurrent placements in the same second
/// cannot collide.
pub fn next_order_id() -> String {
    let seconds = chrono::Utc::now().timestamp();
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect();
    format!("ORD-{}-{}", seconds, suffix)
}
