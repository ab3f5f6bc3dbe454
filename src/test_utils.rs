//! Shared test utilities for the storefront stores.
//!
//! This module provides common helper functions for setting up test databases
//! and building products and cart lines with sensible defaults.

use crate::{
    core::{
        cart::{CartStore, NewCartLine},
        catalog::{CatalogStore, NewProduct},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a catalog store over a fresh in-memory database.
pub async fn setup_catalog() -> Result<CatalogStore> {
    Ok(CatalogStore::new(setup_test_db().await?))
}

/// Creates a cart store over a fresh in-memory database.
pub async fn setup_cart() -> Result<CartStore> {
    Ok(CartStore::new(setup_test_db().await?))
}

/// Creates both stores sharing one in-memory database.
pub async fn setup_stores() -> Result<(CatalogStore, CartStore)> {
    let db = setup_test_db().await?;
    Ok((CatalogStore::new(db.clone()), CartStore::new(db)))
}

/// Builds a product with an auto-assigned id.
///
/// # Defaults
/// * `description`: `"Test product"`
/// * `image_url`: empty
/// * `category`: `"Board Games"`
/// * `stock`: 10
pub fn sample_product(name: &str, price: f64) -> NewProduct {
    sample_product_with_id(0, name, price)
}

/// Builds a product with an explicit id.
pub fn sample_product_with_id(id: i64, name: &str, price: f64) -> NewProduct {
    NewProduct {
        id,
        name: name.to_string(),
        description: "Test product".to_string(),
        price,
        image_url: String::new(),
        category: "Board Games".to_string(),
        stock: 10,
    }
}

/// Builds a cart line for `product_id` with an auto-assigned id.
pub fn sample_line(product_id: i64, price: f64, quantity: i32) -> NewCartLine {
    NewCartLine {
        id: 0,
        product_id,
        name: format!("Product {product_id}"),
        description: "Test product".to_string(),
        price,
        image_url: String::new(),
        category: "Board Games".to_string(),
        stock: 10,
        quantity,
    }
}
