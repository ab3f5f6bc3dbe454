//! Catalog business logic - Handles all product-related operations.
//!
//! This module provides the [`CatalogStore`], which creates, retrieves, updates and
//! deletes products. Every mutation runs in its own database transaction, and the
//! ordered product listing is available both as a one-shot query and as a live view
//! that is republished after each committed change.
//!
//! Listing order is `name` ascending under SQLite's default `BINARY` collation:
//! byte-wise and case-sensitive, so `"Zebra"` sorts before `"apple"`. Rows with equal
//! names are ordered by id.

use crate::{
    core::{
        live::{LiveView, Subscription},
        map_insert_err,
    },
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Product fields supplied by callers when inserting.
///
/// An `id` of 0 (the default when omitted) asks the store to assign one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Explicit identifier, or 0 for auto-assignment
    #[serde(default)]
    pub id: i64,
    /// Display name, must not be blank
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Unit price, finite and non-negative
    pub price: f64,
    /// Image reference (URL or asset name)
    #[serde(default)]
    pub image_url: String,
    /// Category label
    #[serde(default)]
    pub category: String,
    /// Units available, non-negative
    #[serde(default)]
    pub stock: i32,
}

impl From<&product::Model> for NewProduct {
    fn from(model: &product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            description: model.description.clone(),
            price: model.price,
            image_url: model.image_url.clone(),
            category: model.category.clone(),
            stock: model.stock,
        }
    }
}

impl NewProduct {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.id < 0 {
            return Err(Error::constraint(format!(
                "Product id cannot be negative: {}",
                self.id
            )));
        }
        validate_fields(&self.name, self.price, self.stock)
    }

    fn into_active_model(self) -> product::ActiveModel {
        product::ActiveModel {
            id: if self.id > 0 { Set(self.id) } else { NotSet },
            name: Set(self.name.trim().to_string()),
            description: Set(self.description),
            price: Set(self.price),
            image_url: Set(self.image_url),
            category: Set(self.category),
            stock: Set(self.stock),
        }
    }
}

fn validate_fields(name: &str, price: f64, stock: i32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::constraint("Product name cannot be empty"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(Error::constraint(format!("Invalid product price: {price}")));
    }
    if stock < 0 {
        return Err(Error::constraint(format!(
            "Product stock cannot be negative: {stock}"
        )));
    }
    Ok(())
}

#[derive(Debug)]
struct Shared {
    // Serializes write, commit and republish so subscribers see commit order.
    write_gate: Mutex<()>,
    listing: LiveView<Vec<product::Model>>,
}

/// Product catalog backed by the `products` table.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
    shared: Arc<Shared>,
}

impl CatalogStore {
    /// Wraps an open connection whose tables already exist.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            shared: Arc::new(Shared {
                write_gate: Mutex::new(()),
                listing: LiveView::new("catalog.list_all"),
            }),
        }
    }

    /// Inserts a batch of products atomically and returns their ids in input order.
    ///
    /// # Errors
    /// Returns `ConstraintViolation` without writing anything if any product is invalid,
    /// if an explicit id appears twice in the batch, or if an explicit id already exists.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn insert_many(&self, products: Vec<NewProduct>) -> Result<Vec<i64>> {
        let mut explicit_ids = HashSet::new();
        for product in &products {
            product.validate()?;
            if product.id > 0 && !explicit_ids.insert(product.id) {
                return Err(Error::constraint(format!(
                    "Duplicate product id {} in batch",
                    product.id
                )));
            }
        }

        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;

        let mut ids = Vec::with_capacity(products.len());
        for product in products {
            if product.id > 0 && Product::find_by_id(product.id).one(&txn).await?.is_some() {
                return Err(Error::constraint(format!(
                    "Product id {} already exists",
                    product.id
                )));
            }
            let inserted = product
                .into_active_model()
                .insert(&txn)
                .await
                .map_err(map_insert_err)?;
            ids.push(inserted.id);
        }

        txn.commit().await?;
        info!("Inserted {} products", ids.len());
        self.republish().await;
        Ok(ids)
    }

    /// Inserts a product, replacing the existing row when its explicit id is taken.
    ///
    /// Returns the id of the stored row.
    #[instrument(skip(self, product), fields(id = product.id, name = %product.name))]
    pub async fn insert_one(&self, product: NewProduct) -> Result<i64> {
        product.validate()?;

        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;

        let exists =
            product.id > 0 && Product::find_by_id(product.id).one(&txn).await?.is_some();
        let stored = if exists {
            product.into_active_model().update(&txn).await?
        } else {
            product
                .into_active_model()
                .insert(&txn)
                .await
                .map_err(map_insert_err)?
        };

        txn.commit().await?;
        info!(
            "{} product '{}' (ID: {})",
            if exists { "Replaced" } else { "Inserted" },
            stored.name,
            stored.id
        );
        self.republish().await;
        Ok(stored.id)
    }

    /// Stores a batch atomically, replacing rows whose explicit id already exists
    /// and inserting the rest. Returns the stored ids in input order.
    ///
    /// # Errors
    /// Returns `ConstraintViolation` without writing anything if any product is invalid
    /// or an explicit id appears twice in the batch.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn upsert_many(&self, products: Vec<NewProduct>) -> Result<Vec<i64>> {
        let mut explicit_ids = HashSet::new();
        for product in &products {
            product.validate()?;
            if product.id > 0 && !explicit_ids.insert(product.id) {
                return Err(Error::constraint(format!(
                    "Duplicate product id {} in batch",
                    product.id
                )));
            }
        }

        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;

        let mut ids = Vec::with_capacity(products.len());
        let mut replaced = 0usize;
        for product in products {
            let exists =
                product.id > 0 && Product::find_by_id(product.id).one(&txn).await?.is_some();
            let stored = if exists {
                replaced += 1;
                product.into_active_model().update(&txn).await?
            } else {
                product
                    .into_active_model()
                    .insert(&txn)
                    .await
                    .map_err(map_insert_err)?
            };
            ids.push(stored.id);
        }

        txn.commit().await?;
        info!(
            "Stored {} products ({} replaced, {} inserted)",
            ids.len(),
            replaced,
            ids.len() - replaced
        );
        if !ids.is_empty() {
            self.republish().await;
        }
        Ok(ids)
    }

    /// Replaces every field of the row whose id matches `product.id`.
    ///
    /// # Errors
    /// Returns `NotFound` if no product has that id, or `ConstraintViolation` for
    /// invalid fields.
    #[instrument(skip(self, product), fields(id = product.id))]
    pub async fn update(&self, product: &product::Model) -> Result<product::Model> {
        validate_fields(&product.name, product.price, product.stock)?;

        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;

        if Product::find_by_id(product.id).one(&txn).await?.is_none() {
            return Err(Error::NotFound {
                entity: "product",
                id: product.id,
            });
        }

        let updated = NewProduct::from(product)
            .into_active_model()
            .update(&txn)
            .await?;

        txn.commit().await?;
        info!("Updated product '{}' (ID: {})", updated.name, updated.id);
        self.republish().await;
        Ok(updated)
    }

    /// Deletes the row whose id matches `product.id`. Returns the number of rows removed.
    ///
    /// Cart lines copied from the product are not touched.
    #[instrument(skip(self, product), fields(id = product.id))]
    pub async fn delete(&self, product: &product::Model) -> Result<u64> {
        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let removed = Product::delete_by_id(product.id)
            .exec(&txn)
            .await?
            .rows_affected;
        txn.commit().await?;

        if removed > 0 {
            info!("Deleted product {}", product.id);
            self.republish().await;
        } else {
            debug!("No product {} to delete", product.id);
        }
        Ok(removed)
    }

    /// Deletes every product. Returns the number of rows removed.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<u64> {
        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let removed = Product::delete_many().exec(&txn).await?.rows_affected;
        txn.commit().await?;

        info!("Deleted all {} products", removed);
        if removed > 0 {
            self.republish().await;
        }
        Ok(removed)
    }

    /// Retrieves a product by id, returning `None` when it does not exist.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<product::Model>> {
        Product::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Retrieves all products ordered by name.
    pub async fn list_all(&self) -> Result<Vec<product::Model>> {
        Product::find()
            .order_by_asc(product::Column::Name)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Number of products in the catalog.
    pub async fn count(&self) -> Result<u64> {
        Product::find().count(&self.db).await.map_err(Into::into)
    }

    /// Subscribes to the ordered listing. The current listing is delivered first.
    pub async fn watch_all(&self) -> Result<Subscription<Vec<product::Model>>> {
        let _gate = self.shared.write_gate.lock().await;
        let current = self.list_all().await?;
        Ok(self.shared.listing.subscribe(current))
    }

    // Called with the write gate held, after commit. A failed refresh leaves
    // subscribers on the previous value until the next write.
    async fn republish(&self) {
        if !self.shared.listing.is_observed() {
            return;
        }
        match self.list_all().await {
            Ok(rows) => self.shared.listing.publish(&rows),
            Err(e) => warn!("Failed to refresh catalog listing: {}", e),
        }
    }
}
