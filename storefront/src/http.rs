use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::error::StoreError;
use crate::inventory::{AddInventoryRequest, InventoryService};
use crate::model::{CartLineItem, OrderStatus, Product, ProductUpdate};
use crate::object_store::ObjectStore;
use crate::orders::OrderService;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use http::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub carts: CartService,
    pub orders: OrderService,
    pub inventory: InventoryService,
    pub catalog: CatalogService,
    pub objects: Arc<dyn ObjectStore>,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed on a dependency");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/products", post(create_product).get(get_all_products))
        .route(
            "/api/products/{product_id}",
            get(view_product).put(edit_product).delete(delete_product),
        )
        .route("/api/products/by-name/{item_name}", get(find_product_by_name))
        .route("/api/products/{product_id}/inventory", get(get_product_inventory))
        .route("/api/inventory", get(get_all_inventory).post(add_inventory))
        .route("/api/users/{user_id}/cart", get(get_cart).post(add_to_cart))
        .route("/api/users/{user_id}/checkout", post(checkout))
        .route("/api/users/{user_id}/orders", get(get_orders).post(place_order))
        .route(
            "/api/users/{user_id}/products/{product_id}",
            get(view_product_for_user),
        )
        .route("/api/orders", get(get_all_orders))
        .route("/api/orders/{order_id}/status", put(update_order_status))
        .route("/api/orders/{order_id}/receipt", post(generate_receipt))
        .route("/objects/{*key}", get(serve_object))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

/// Body fields are checked here rather than by the typed extractor so a
/// missing or malformed field surfaces as a 400 validation error, not a 422.
fn parse_body<T: DeserializeOwned>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Validation(format!("invalid request body: {}", e)))
}

async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, StoreError> {
    let product: Product = parse_body(body)?;
    let product = state.catalog.create_product(product).await?;
    Ok(Json(json!({
        "message": "Product created successfully",
        "product": product,
    })))
}

async fn get_all_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StoreError> {
    let items = state.catalog.get_all_products().await?;
    Ok(Json(json!({ "items": items, "status": "success" })))
}

async fn view_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    let product = state.catalog.view_product(&product_id).await?;
    Ok(Json(product))
}

async fn find_product_by_name(
    State(state): State<AppState>,
    Path(item_name): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    let product = state.catalog.find_product_by_name(&item_name).await?;
    Ok(Json(product))
}

async fn view_product_for_user(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, StoreError> {
    let view = state
        .catalog
        .view_product_for_user(&user_id, &product_id)
        .await?;
    Ok(Json(view))
}

async fn edit_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, StoreError> {
    let update: ProductUpdate = parse_body(body)?;
    let product = state.catalog.edit_product(&product_id, update).await?;
    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": product,
    })))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    state.catalog.delete_product(&product_id).await?;
    Ok(Json(json!({
        "message": format!("Product {} deleted successfully", product_id),
    })))
}

async fn get_product_inventory(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    let inventory = state.inventory.get_product_inventory(&product_id).await?;
    Ok(Json(inventory))
}

async fn get_all_inventory(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StoreError> {
    let records = state.inventory.get_all_inventory().await?;
    Ok(Json(records))
}

async fn add_inventory(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, StoreError> {
    let request: AddInventoryRequest = parse_body(body)?;
    state.inventory.add_inventory(request).await?;
    Ok(Json(json!({ "message": "Inventory added successfully" })))
}

async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    let items = state.carts.get_cart(&user_id).await?;
    if items.is_empty() {
        return Ok(Json(json!({ "message": "Cart is empty" })));
    }
    Ok(Json(json!(items)))
}

async fn add_to_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, StoreError> {
    let item: CartLineItem = parse_body(body)?;
    let items = state.carts.add_to_cart(&user_id, item).await?;
    Ok(Json(items))
}

async fn checkout(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    state.orders.checkout(&user_id).await?;
    Ok(Json(json!({ "message": "Checkout complete" })))
}

async fn place_order(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    let order_id = state.orders.place_order(&user_id).await?;
    Ok(Json(json!({ "order_id": order_id })))
}

async fn get_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    let orders = state.orders.get_orders(&user_id).await?;
    Ok(Json(orders))
}

async fn get_all_orders(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StoreError> {
    let orders = state.orders.get_all_orders().await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    customer_name: String,
    status: String,
}

async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, StoreError> {
    let request: UpdateStatusRequest = parse_body(body)?;
    let status: OrderStatus = request
        .status
        .parse()
        .map_err(|_| StoreError::Validation(format!("unknown status: {}", request.status)))?;
    let status = state
        .orders
        .update_order_status(&order_id, &request.customer_name, status)
        .await?;
    Ok(Json(json!({ "order_id": order_id, "status": status })))
}

#[derive(Debug, Deserialize)]
struct ReceiptRequest {
    customer_name: String,
}

async fn generate_receipt(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, StoreError> {
    let request: ReceiptRequest = parse_body(body)?;
    let url = state
        .orders
        .generate_receipt(&order_id, &request.customer_name)
        .await?;
    Ok(Json(json!({ "receipt_url": url })))
}

async fn serve_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, StoreError> {
    let object = state
        .objects
        .get_object(&key)
        .await
        .map_err(StoreError::dependency)?
        .ok_or_else(|| StoreError::NotFound(format!("object {}", key)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, object.content_type)],
        object.bytes,
    )
        .into_response())
}

pub async fn run_backend(
    server_address: &str,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);

    tracing::info!("Starting backend service at {}", server_address);
    let listener = tokio::net::TcpListener::bind(server_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
