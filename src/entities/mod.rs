//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the catalog and cart tables plus the schema metadata table.
//! Cart lines copy product fields instead of referencing them, so no relations are declared.

pub mod cart_line;
pub mod product;
pub mod schema_meta;

// Re-export specific types to avoid conflicts
pub use cart_line::{Column as CartLineColumn, Entity as CartLine, Model as CartLineModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use schema_meta::{Column as SchemaMetaColumn, Entity as SchemaMeta, Model as SchemaMetaModel};
