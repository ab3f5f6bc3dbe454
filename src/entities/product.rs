//! Product entity - Represents an item in the catalog.
//!
//! Products are the source rows that cart lines are copied from. Deleting a product
//! never touches the cart, since cart lines hold their own snapshot of these fields.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product, assigned on insert
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Catan"), used for catalog ordering
    pub name: String,
    /// Free-form description shown on the detail page
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Image reference, either a URL or a bundled asset name
    pub image_url: String,
    /// Category label (e.g., "Board Games")
    pub category: String,
    /// Units available
    pub stock: i32,
}

impl Model {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Products have no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
