#![allow(dead_code)]

use storefront::{NewCartLine, NewProduct, Result, Storefront};
use tempfile::TempDir;

/// Opens a store over a fresh in-memory database.
pub async fn memory_store() -> Result<Storefront> {
    Storefront::open("sqlite::memory:").await
}

/// URL of a file-backed database inside `dir`, created on first open.
pub fn file_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("store.sqlite").display())
}

pub fn product(id: i64, name: &str, price: f64) -> NewProduct {
    NewProduct {
        id,
        name: name.to_string(),
        description: format!("{name} description"),
        price,
        image_url: format!("{}.png", name.to_lowercase()),
        category: "Board Games".to_string(),
        stock: 5,
    }
}

pub fn line(product_id: i64, price: f64, quantity: i32) -> NewCartLine {
    NewCartLine {
        id: 0,
        product_id,
        name: format!("Product {product_id}"),
        description: String::new(),
        price,
        image_url: String::new(),
        category: "Board Games".to_string(),
        stock: 5,
        quantity,
    }
}
