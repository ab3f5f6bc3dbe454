//! Core business logic - framework-agnostic catalog and cart stores.
//!
//! Both stores wrap a `SeaORM` connection, run every mutation in its own database
//! transaction, and republish their live views once the transaction commits.

/// Shopping cart lines, quantities and the running total
pub mod cart;
/// Product catalog operations
pub mod catalog;
/// Subscriber registry backing live views
pub mod live;
/// Remote-first catalog access with local fallback
pub mod repository;

use crate::config::database::open_database;
use crate::errors::{Error, Result};
use cart::CartStore;
use catalog::CatalogStore;
use sea_orm::{DbErr, SqlErr};

/// Both stores over one validated database connection.
#[derive(Debug, Clone)]
pub struct Storefront {
    /// Product catalog
    pub catalog: CatalogStore,
    /// Shopping cart
    pub cart: CartStore,
}

impl Storefront {
    /// Opens the database at `database_url`, creating tables and checking the schema
    /// fingerprint, and wraps it in both stores.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if the database was written by an incompatible layout,
    /// or `StorageUnavailable` if it cannot be opened.
    pub async fn open(database_url: &str) -> Result<Self> {
        let db = open_database(database_url).await?;
        Ok(Self {
            catalog: CatalogStore::new(db.clone()),
            cart: CartStore::new(db),
        })
    }
}

/// Maps a failed INSERT to `ConstraintViolation` when SQLite rejected a duplicate key.
pub(crate) fn map_insert_err(err: DbErr) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => Error::constraint(message),
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::sample_product;

    #[tokio::test]
    async fn test_open_shares_one_database_between_stores() -> Result<()> {
        let store = Storefront::open("sqlite::memory:").await?;
        let id = store
            .catalog
            .insert_one(sample_product("Catan", 29990.0))
            .await?;
        let catan = store.catalog.get_by_id(id).await?.unwrap();

        store.cart.add_product(&catan).await?;
        assert_eq!(store.cart.total().await?, Some(29990.0));

        // Clones see the same rows
        let copy = store.clone();
        assert_eq!(copy.catalog.count().await?, 1);
        assert_eq!(copy.cart.list_all().await?.len(), 1);
        Ok(())
    }
}
