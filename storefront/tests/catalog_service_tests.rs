use std::error::Error;

use common::test_helpers::generate_unique_id;
use storefront::error::StoreError;
use storefront::model::{Product, ProductUpdate};
use storefront::storage::CatalogStore;

use test_helpers::{line, product, TestContext};

#[tokio::test]
async fn created_products_reach_the_store_queue_and_bus(
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let product_id = generate_unique_id("PROD");

    ctx.catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await?;

    let stored = ctx.catalog_store.get_product(&product_id).await?.unwrap();
    assert_eq!(stored.item_name, "Widget");

    let sent = ctx.queue.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["product_id"], product_id.as_str());

    let events = ctx.events.published().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, "storefront.products");
    assert_eq!(events[0].detail_type, "create_product");
    assert_eq!(events[0].detail["product_id"], product_id.as_str());
    Ok(())
}

#[tokio::test]
async fn creation_rejects_missing_ids_and_bad_prices() {
    let ctx = TestContext::new();

    let result = ctx
        .catalog
        .create_product(product("", "Widget", "10.00"))
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let result = ctx
        .catalog
        .create_product(product("P1", "Widget", "cheap"))
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn a_queue_failure_surfaces_but_keeps_the_saved_product(
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::with_failing_queue();
    let product_id = generate_unique_id("PROD");

    let result = ctx
        .catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await;
    assert!(matches!(result, Err(StoreError::Dependency(_))));

    // No rollback: the product is still readable.
    let stored = ctx.catalog_store.get_product(&product_id).await?;
    assert!(stored.is_some());
    Ok(())
}

#[tokio::test]
async fn an_event_bus_failure_is_swallowed() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::with_failing_event_bus();
    let product_id = generate_unique_id("PROD");

    // Publish failures are logged, never surfaced.
    ctx.catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await?;
    Ok(())
}

#[tokio::test]
async fn products_are_viewable_and_listable() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let a = generate_unique_id("PROD");
    let b = generate_unique_id("PROD");

    ctx.catalog.create_product(product(&a, "Widget", "10.00")).await?;
    ctx.catalog.create_product(product(&b, "Bolt", "3.50")).await?;

    let viewed = ctx.catalog.view_product(&a).await?;
    assert_eq!(viewed.product_id, a);

    let all = ctx.catalog.get_all_products().await?;
    assert_eq!(all.len(), 2);

    let result = ctx.catalog.view_product("no-such-product").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let result = ctx.catalog.view_product("").await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn products_resolve_by_display_name() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let product_id = generate_unique_id("PROD");
    ctx.catalog
        .create_product(product(&product_id, "Left-Handed Hammer", "25.00"))
        .await?;

    let found = ctx.catalog.find_product_by_name("Left-Handed Hammer").await?;
    assert_eq!(found.product_id, product_id);

    let result = ctx.catalog.find_product_by_name("Unheard-Of Gadget").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn the_user_view_carries_the_carted_quantity() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let product_id = generate_unique_id("PROD");
    let user_id = generate_unique_id("USER");
    ctx.catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await?;

    let view = ctx
        .catalog
        .view_product_for_user(&user_id, &product_id)
        .await?;
    assert_eq!(view.in_user_cart, 0);

    ctx.carts
        .add_to_cart(&user_id, line(&product_id, 3, "10.00", "Widget"))
        .await?;
    let view = ctx
        .catalog
        .view_product_for_user(&user_id, &product_id)
        .await?;
    assert_eq!(view.in_user_cart, 3);
    Ok(())
}

#[tokio::test]
async fn edits_touch_only_whitelisted_fields() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let product_id = generate_unique_id("PROD");
    ctx.catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await?;

    let updated = ctx
        .catalog
        .edit_product(
            &product_id,
            ProductUpdate {
                price: Some("12.50".to_string()),
                brand: Some("Globex".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.price, "12.50");
    assert_eq!(updated.brand, "Globex");
    assert_eq!(updated.item_name, "Widget");

    let result = ctx
        .catalog
        .edit_product(&product_id, ProductUpdate::default())
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let result = ctx
        .catalog
        .edit_product(
            "no-such-product",
            ProductUpdate {
                price: Some("1.00".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn deletes_are_unconditional() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let product_id = generate_unique_id("PROD");
    let user_id = generate_unique_id("USER");

    ctx.catalog
        .create_product(product(&product_id, "Widget", "10.00"))
        .await?;
    // A cart referencing the product does not block deletion.
    ctx.carts
        .add_to_cart(&user_id, line(&product_id, 1, "10.00", "Widget"))
        .await?;

    ctx.catalog.delete_product(&product_id).await?;
    let result = ctx.catalog.view_product(&product_id).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn product_json_keeps_prices_as_decimal_strings() -> Result<(), Box<dyn Error + Send + Sync>>
{
    let p = Product {
        product_id: "P1".to_string(),
        item_name: "Widget".to_string(),
        description: "".to_string(),
        price: "10.00".to_string(),
        brand: "".to_string(),
        category: "".to_string(),
    };
    let value = serde_json::to_value(&p)?;
    assert_eq!(value["price"], "10.00");
    Ok(())
}
