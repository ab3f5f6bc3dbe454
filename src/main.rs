use dotenvy::dotenv;
use storefront::{
    CatalogRepository, Storefront,
    config::{catalog, database},
    errors::Result,
    remote::{self, HttpProductApi},
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    match dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found, using process environment"),
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    // 3. Open the store; a schema fingerprint mismatch stops startup here
    let database_url = database::get_database_url();
    let store = Storefront::open(&database_url)
        .await
        .inspect_err(|e| error!("Failed to open store: {}", e))?;

    // 4. Seed the catalog from config.toml when it is empty
    match catalog::load_default_config() {
        Ok(config) => {
            let seeded = catalog::seed_catalog(&store.catalog, &config)
                .await
                .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
            info!("Catalog seeding inserted {} products.", seeded);
        }
        Err(e) => warn!("Skipping catalog seed: {}", e),
    }

    // 5. Refresh from the remote catalog service when one is configured
    let products = match remote::get_api_url() {
        Some(url) => match HttpProductApi::new(url.as_str()) {
            Ok(api) => {
                let repository = CatalogRepository::new(api, store.catalog.clone());
                let fetched = repository.list_products().await?;
                info!(
                    "Catalog listing served from {:?} source ({}).",
                    fetched.source, url
                );
                fetched.value
            }
            Err(e) => {
                warn!("Remote catalog client unavailable: {}", e);
                store.catalog.list_all().await?
            }
        },
        None => store.catalog.list_all().await?,
    };

    // 6. Report current state
    let lines = store.cart.list_all().await?;
    info!(
        "Store ready: {} products in catalog, {} lines in cart.",
        products.len(),
        lines.len()
    );
    match store.cart.total().await? {
        Some(total) => info!("Cart total: {:.2}", total),
        None => info!("Cart is empty."),
    }

    Ok(())
}
