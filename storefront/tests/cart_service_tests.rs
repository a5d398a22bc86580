use std::error::Error;

use common::test_helpers::generate_unique_id;
use storefront::error::StoreError;

use test_helpers::{line, TestContext};

#[tokio::test]
async fn adding_the_same_product_twice_merges_quantities(
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let user_id = generate_unique_id("USER");

    ctx.carts
        .add_to_cart(&user_id, line("P1", 3, "10.00", "Widget"))
        .await?;
    ctx.carts
        .add_to_cart(&user_id, line("P1", 2, "10.00", "Widget"))
        .await?;

    let items = ctx.carts.get_cart(&user_id).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, "P1");
    assert_eq!(items[0].quantity, 5);
    Ok(())
}

#[tokio::test]
async fn distinct_products_keep_their_own_lines() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let user_id = generate_unique_id("USER");

    ctx.carts
        .add_to_cart(&user_id, line("P1", 1, "10.00", "Widget"))
        .await?;
    ctx.carts
        .add_to_cart(&user_id, line("P2", 4, "3.50", "Bolt"))
        .await?;

    let items = ctx.carts.get_cart(&user_id).await?;
    assert_eq!(items.len(), 2);
    // Insertion order is preserved
    assert_eq!(items[0].product_id, "P1");
    assert_eq!(items[1].product_id, "P2");
    assert_eq!(items[1].quantity, 4);
    Ok(())
}

#[tokio::test]
async fn merging_keeps_the_stored_price_and_name() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let user_id = generate_unique_id("USER");

    ctx.carts
        .add_to_cart(&user_id, line("P1", 1, "10.00", "Widget"))
        .await?;
    // A later add with a different price only bumps the quantity.
    ctx.carts
        .add_to_cart(&user_id, line("P1", 2, "99.99", "Renamed Widget"))
        .await?;

    let items = ctx.carts.get_cart(&user_id).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[0].price, "10.00");
    assert_eq!(items[0].item_name, "Widget");
    Ok(())
}

#[tokio::test]
async fn non_positive_quantities_are_rejected() {
    let ctx = TestContext::new();
    let user_id = generate_unique_id("USER");

    for quantity in [0, -1, -50] {
        let result = ctx
            .carts
            .add_to_cart(&user_id, line("P1", quantity, "10.00", "Widget"))
            .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    // Nothing was written
    let items = ctx.carts.get_cart(&user_id).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn unparseable_prices_are_rejected() {
    let ctx = TestContext::new();
    let user_id = generate_unique_id("USER");

    let result = ctx
        .carts
        .add_to_cart(&user_id, line("P1", 1, "ten dollars", "Widget"))
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn missing_carts_read_as_empty() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let items = ctx.carts.get_cart("nobody-ever-shopped").await?;
    assert!(items.is_empty());
    Ok(())
}

#[tokio::test]
async fn add_to_cart_returns_the_updated_cart() -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = TestContext::new();
    let user_id = generate_unique_id("USER");

    let returned = ctx
        .carts
        .add_to_cart(&user_id, line("P1", 2, "10.00", "Widget"))
        .await?;
    let stored = ctx.carts.get_cart(&user_id).await?;
    assert_eq!(returned, stored);
    Ok(())
}
