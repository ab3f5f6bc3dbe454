//! Cart line entity - One product's presence in the shopping cart.
//!
//! Each line is a snapshot of the product's display fields taken when it was added,
//! plus a quantity. `product_id` is a plain column, not a foreign key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_lines")]
pub struct Model {
    /// Unique identifier for the line, assigned on insert
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the product this line was copied from
    pub product_id: i64,
    /// Product name at the time of insertion
    pub name: String,
    /// Product description at the time of insertion
    pub description: String,
    /// Unit price at the time of insertion
    pub price: f64,
    /// Product image reference at the time of insertion
    pub image_url: String,
    /// Product category at the time of insertion
    pub category: String,
    /// Product stock at the time of insertion
    pub stock: i32,
    /// Number of units in the cart
    pub quantity: i32,
}

impl Model {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Cart lines have no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
