use std::error::Error;

use common::test_helpers::generate_unique_id;
use storefront::error::StoreError;
use storefront::inventory::AddInventoryRequest;
use storefront::model::{local_timestamp, InventoryRecord};
use storefront::storage::InventoryStore;

use test_helpers::{product, TestContext};

fn stock_request(product_id: &str, quantity: i64) -> AddInventoryRequest {
    AddInventoryRequest {
        product_id: product_id.to_string(),
        quantity: Some(quantity),
        remark: None,
    }
}

#[tokio::test]
async fn unknown_products_have_no_inventory() {
    let ctx = TestContext::new();
    let result = ctx.inventory.get_product_inventory("no-such-product").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn stock_is_the_exact_sum_of_all_deltas() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let product_id = generate_unique_id("PROD");
    ctx.catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await?;

    for delta in [5i64, -2, 10, -13] {
        ctx.inventory.add_inventory(stock_request(&product_id, delta)).await?;
    }

    let inventory = ctx.inventory.get_product_inventory(&product_id).await?;
    assert_eq!(inventory.total_quantity, 0);

    ctx.inventory.add_inventory(stock_request(&product_id, -4)).await?;
    let inventory = ctx.inventory.get_product_inventory(&product_id).await?;
    assert_eq!(inventory.total_quantity, -4);
    Ok(())
}

#[tokio::test]
async fn stock_in_requires_an_existing_product() {
    let ctx = TestContext::new();
    let result = ctx
        .inventory
        .add_inventory(stock_request("no-such-product", 5))
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn stock_in_requires_product_id_and_quantity() {
    let ctx = TestContext::new();

    let result = ctx
        .inventory
        .add_inventory(AddInventoryRequest {
            product_id: "".to_string(),
            quantity: Some(5),
            remark: None,
        })
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let result = ctx
        .inventory
        .add_inventory(AddInventoryRequest {
            product_id: "P1".to_string(),
            quantity: None,
            remark: None,
        })
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn stock_in_fills_in_the_default_remark() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let product_id = generate_unique_id("PROD");
    ctx.catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await?;

    ctx.inventory.add_inventory(stock_request(&product_id, 5)).await?;
    ctx.inventory
        .add_inventory(AddInventoryRequest {
            product_id: product_id.clone(),
            quantity: Some(3),
            remark: Some("Restock from supplier".to_string()),
        })
        .await?;

    let records = ctx.inventory_store.records_for_product(&product_id).await?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].remark, "Default remark.");
    assert_eq!(records[1].remark, "Restock from supplier");
    Ok(())
}

#[tokio::test]
async fn ledger_timestamps_carry_second_precision() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let product_id = generate_unique_id("PROD");
    ctx.catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await?;

    ctx.inventory.add_inventory(stock_request(&product_id, 5)).await?;

    let records = ctx.inventory_store.records_for_product(&product_id).await?;
    assert_eq!(records[0].recorded_at.and_utc().timestamp_subsec_nanos(), 0);
    Ok(())
}

#[tokio::test]
async fn the_full_ledger_is_scannable() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let a = generate_unique_id("PROD");
    let b = generate_unique_id("PROD");
    ctx.catalog.create_product(product(&a, "Widget", "10.00")).await?;
    ctx.catalog.create_product(product(&b, "Bolt", "3.50")).await?;

    ctx.inventory.add_inventory(stock_request(&a, 5)).await?;
    ctx.inventory.add_inventory(stock_request(&b, 7)).await?;

    let records = ctx.inventory.get_all_inventory().await?;
    assert_eq!(records.len(), 2);
    Ok(())
}

#[tokio::test]
async fn ledger_rows_serialize_with_the_plain_datetime_format(
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let record = InventoryRecord {
        product_id: "P1".to_string(),
        quantity: -2,
        remark: "Purchased item!".to_string(),
        recorded_at: local_timestamp(),
    };
    let value = serde_json::to_value(&record)?;
    // Integer delta, string timestamp like "2026-08-07 10:20:30"
    assert!(value["quantity"].is_i64());
    let ts = value["recorded_at"].as_str().unwrap();
    assert_eq!(ts.len(), 19);
    assert_eq!(&ts[4..5], "-");
    assert_eq!(&ts[10..11], " ");
    Ok(())
}
