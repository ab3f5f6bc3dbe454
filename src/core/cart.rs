//! Cart business logic - Handles shopping cart lines and the running total.
//!
//! Each cart line is a snapshot of a product taken when it was added, plus a quantity.
//! The store never joins back to the catalog, so later catalog edits or deletions do
//! not change existing lines. Callers are expected to keep at most one line per product
//! by checking [`CartStore::get_by_product`] before inserting, or by using
//! [`CartStore::add_product`], which does that check inside one transaction.
//!
//! The line listing and the total are live views. After every committed write that
//! changes at least one row, both are recomputed and pushed to their subscribers.

use crate::{
    core::{
        live::{LiveView, Subscription},
        map_insert_err,
    },
    entities::{CartLine, cart_line, product},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveValue::NotSet, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Cart line fields supplied by callers when inserting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCartLine {
    /// Explicit identifier, or 0 for auto-assignment
    #[serde(default)]
    pub id: i64,
    /// Product the line was copied from
    pub product_id: i64,
    /// Product name snapshot
    pub name: String,
    /// Product description snapshot
    pub description: String,
    /// Unit price snapshot
    pub price: f64,
    /// Product image reference snapshot
    pub image_url: String,
    /// Product category snapshot
    pub category: String,
    /// Product stock snapshot
    pub stock: i32,
    /// Units in the cart, at least 1
    pub quantity: i32,
}

impl NewCartLine {
    /// Copies the display fields of `product` into a new line.
    #[must_use]
    pub fn from_product(product: &product::Model, quantity: i32) -> Self {
        Self {
            id: 0,
            product_id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            stock: product.stock,
            quantity,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.id < 0 {
            return Err(Error::constraint(format!(
                "Cart line id cannot be negative: {}",
                self.id
            )));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::constraint(format!(
                "Invalid cart line price: {}",
                self.price
            )));
        }
        validate_quantity(self.quantity)
    }

    fn into_active_model(self) -> cart_line::ActiveModel {
        cart_line::ActiveModel {
            id: if self.id > 0 { Set(self.id) } else { NotSet },
            product_id: Set(self.product_id),
            name: Set(self.name),
            description: Set(self.description),
            price: Set(self.price),
            image_url: Set(self.image_url),
            category: Set(self.category),
            stock: Set(self.stock),
            quantity: Set(self.quantity),
        }
    }
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(Error::constraint(format!(
            "Cart quantity must be positive: {quantity}"
        )));
    }
    Ok(())
}

#[derive(Debug)]
struct Shared {
    // Serializes write, commit and republish so subscribers see commit order.
    write_gate: Mutex<()>,
    lines: LiveView<Vec<cart_line::Model>>,
    total: LiveView<Option<f64>>,
}

/// Shopping cart backed by the `cart_lines` table.
#[derive(Debug, Clone)]
pub struct CartStore {
    db: DatabaseConnection,
    shared: Arc<Shared>,
}

impl CartStore {
    /// Wraps an open connection whose tables already exist.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            shared: Arc::new(Shared {
                write_gate: Mutex::new(()),
                lines: LiveView::new("cart.list_all"),
                total: LiveView::new("cart.total"),
            }),
        }
    }

    /// Inserts a new line. Never overwrites an existing one.
    ///
    /// # Errors
    /// Returns `ConstraintViolation` if the explicit id is already taken, the
    /// quantity is not positive, or the price is invalid.
    #[instrument(skip(self, line), fields(product_id = line.product_id, quantity = line.quantity))]
    pub async fn insert(&self, line: NewCartLine) -> Result<cart_line::Model> {
        line.validate()?;

        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;

        if line.id > 0 && CartLine::find_by_id(line.id).one(&txn).await?.is_some() {
            return Err(Error::constraint(format!(
                "Cart line id {} already exists",
                line.id
            )));
        }
        let inserted = line
            .into_active_model()
            .insert(&txn)
            .await
            .map_err(map_insert_err)?;

        txn.commit().await?;
        info!(
            "Added '{}' x{} to cart (line {})",
            inserted.name, inserted.quantity, inserted.id
        );
        self.republish().await;
        Ok(inserted)
    }

    /// Adds one unit of `product` to the cart.
    ///
    /// Increments the quantity of the existing line for the product, or inserts a
    /// fresh snapshot with quantity 1 when there is none.
    ///
    /// # Errors
    /// Returns `ConstraintViolation` if the product is out of stock.
    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub async fn add_product(&self, product: &product::Model) -> Result<cart_line::Model> {
        if !product.in_stock() {
            return Err(Error::constraint(format!(
                "Product '{}' is out of stock",
                product.name
            )));
        }

        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;

        let existing = CartLine::find()
            .filter(cart_line::Column::ProductId.eq(product.id))
            .order_by_asc(cart_line::Column::Id)
            .one(&txn)
            .await?;

        let line = match existing {
            Some(line) => {
                let quantity = line.quantity + 1;
                let mut active: cart_line::ActiveModel = line.into();
                active.quantity = Set(quantity);
                active.update(&txn).await?
            }
            None => {
                NewCartLine::from_product(product, 1)
                    .into_active_model()
                    .insert(&txn)
                    .await?
            }
        };

        txn.commit().await?;
        info!(
            "Cart now holds '{}' x{} (line {})",
            line.name, line.quantity, line.id
        );
        self.republish().await;
        Ok(line)
    }

    /// Removes every line. Returns the number of lines removed.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<u64> {
        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let removed = CartLine::delete_many().exec(&txn).await?.rows_affected;
        txn.commit().await?;

        info!("Cleared cart ({} lines)", removed);
        if removed > 0 {
            self.republish().await;
        }
        Ok(removed)
    }

    /// Sets the quantity of the line for `product_id`. Returns the number of lines changed.
    ///
    /// Does nothing when the product has no line in the cart.
    ///
    /// # Errors
    /// Returns `ConstraintViolation` if `quantity` is not positive.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, product_id: i64, quantity: i32) -> Result<u64> {
        validate_quantity(quantity)?;

        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let changed = CartLine::update_many()
            .col_expr(cart_line::Column::Quantity, Expr::value(quantity))
            .filter(cart_line::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?
            .rows_affected;
        txn.commit().await?;

        if changed > 0 {
            info!("Set quantity of product {} to {}", product_id, quantity);
            self.republish().await;
        } else {
            debug!("No cart line for product {}", product_id);
        }
        Ok(changed)
    }

    /// Removes the line for `product_id`. Returns the number of lines removed.
    #[instrument(skip(self))]
    pub async fn remove_by_product(&self, product_id: i64) -> Result<u64> {
        let _gate = self.shared.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let removed = CartLine::delete_many()
            .filter(cart_line::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?
            .rows_affected;
        txn.commit().await?;

        if removed > 0 {
            info!("Removed product {} from cart", product_id);
            self.republish().await;
        } else {
            debug!("No cart line for product {}", product_id);
        }
        Ok(removed)
    }

    /// Retrieves the first line for `product_id`, returning `None` when there is none.
    pub async fn get_by_product(&self, product_id: i64) -> Result<Option<cart_line::Model>> {
        CartLine::find()
            .filter(cart_line::Column::ProductId.eq(product_id))
            .order_by_asc(cart_line::Column::Id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Retrieves all cart lines. Callers must not rely on the order.
    pub async fn list_all(&self) -> Result<Vec<cart_line::Model>> {
        CartLine::find().all(&self.db).await.map_err(Into::into)
    }

    /// Sum of `price * quantity` over all lines.
    ///
    /// Returns `None` for an empty cart, which is distinct from a cart worth zero.
    pub async fn total(&self) -> Result<Option<f64>> {
        let total = CartLine::find()
            .select_only()
            .column_as(Expr::cust("SUM(price * quantity)"), "total")
            .into_tuple::<Option<f64>>()
            .one(&self.db)
            .await?;
        Ok(total.flatten())
    }

    /// Subscribes to the line listing. The current lines are delivered first.
    pub async fn watch_lines(&self) -> Result<Subscription<Vec<cart_line::Model>>> {
        let _gate = self.shared.write_gate.lock().await;
        let current = self.list_all().await?;
        Ok(self.shared.lines.subscribe(current))
    }

    /// Subscribes to the total. The current total is delivered first.
    pub async fn watch_total(&self) -> Result<Subscription<Option<f64>>> {
        let _gate = self.shared.write_gate.lock().await;
        let current = self.total().await?;
        Ok(self.shared.total.subscribe(current))
    }

    // Called with the write gate held, after commit. A failed refresh leaves
    // subscribers on the previous value until the next write.
    async fn republish(&self) {
        if self.shared.lines.is_observed() {
            match self.list_all().await {
                Ok(lines) => self.shared.lines.publish(&lines),
                Err(e) => warn!("Failed to refresh cart lines: {}", e),
            }
        }
        if self.shared.total.is_observed() {
            match self.total().await {
                Ok(total) => self.shared.total.publish(&total),
                Err(e) => warn!("Failed to refresh cart total: {}", e),
            }
        }
    }
}
