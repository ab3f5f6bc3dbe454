//! Catalog seed loading from config.toml
//!
//! This module loads the sample products used to populate the catalog.
//! Seeding only happens when product 1 is missing. Configured products with an
//! explicit id replace the row holding that id, so reseeding after product 1 was
//! deleted restores the sample rows instead of failing on the surviving ones.

use crate::core::catalog::{CatalogStore, NewProduct};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Products inserted into an empty catalog
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

/// Loads catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads catalog configuration from `CATALOG_CONFIG`, or ./config.toml when unset
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    debug!("Loading catalog configuration from {}", path);
    load_config(path)
}

/// Stores the configured products if the catalog has no product with id 1.
///
/// Returns the number of products written.
pub async fn seed_catalog(catalog: &CatalogStore, config: &Config) -> Result<usize> {
    if catalog.get_by_id(1).await?.is_some() {
        debug!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    let ids = catalog.upsert_many(config.products.clone()).await?;
    info!("Seeded catalog with {} products", ids.len());
    Ok(ids.len())
}
