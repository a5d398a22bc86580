use clap::Parser;
use common::config::Config;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use storefront::cart::CartService;
use storefront::catalog::CatalogService;
use storefront::http::{run_backend, AppState};
use storefront::inventory::InventoryService;
use storefront::object_store::PgObjectStore;
use storefront::orders::OrderService;
use storefront::pg_storage::PgStorage;
use storefront::queue::{PgmqEventBus, PgmqMessageQueue};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/total_config.yaml")]
    config: String,
}

fn initialize_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    println!("Loading config from: {}", args.config);
    let config = Config::load(&args.config)?;
    initialize_tracing(&config.backend.log_level);

    tracing::info!("Starting {} backend", config.common.project_name);

    let storage = Arc::new(PgStorage::connect(&config.common.database_url).await?);
    storage.run_migrations(Path::new("migrations")).await?;

    let objects = Arc::new(PgObjectStore::new(
        storage.db.clone(),
        config.objects.public_url_base.clone(),
    ));
    let product_queue = Arc::new(
        PgmqMessageQueue::new(&config.common.database_url, &config.events.product_queue).await?,
    );
    let event_bus = Arc::new(
        PgmqEventBus::new(&config.common.database_url, &config.events.event_queue).await?,
    );

    let state = AppState {
        carts: CartService::new(storage.clone()),
        orders: OrderService::new(
            storage.clone(),
            storage.clone(),
            storage.clone(),
            objects.clone(),
        ),
        inventory: InventoryService::new(storage.clone(), storage.clone()),
        catalog: CatalogService::new(
            storage.clone(),
            storage.clone(),
            product_queue,
            event_bus,
            config.events.event_source.clone(),
        ),
        objects,
    };

    run_backend(&config.backend.server_address, state).await
}
