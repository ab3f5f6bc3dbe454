//! Database configuration module for the storefront store.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the database layout always follows the Rust structs. The same generated statements
//! are hashed into a schema fingerprint that is stored on first open and compared on every
//! later open, refusing to run against a database written by an incompatible layout.

use crate::entities::{CartLine, Product, SchemaMeta, schema_meta};
use crate::errors::{Error, Result};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Set,
};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

/// Default database location used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://storefront.sqlite?mode=rwc";

/// `schema_meta` key holding the schema fingerprint.
pub const FINGERPRINT_KEY: &str = "schema_fingerprint";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
///
/// Existing tables are left untouched; layout changes are caught by
/// [`verify_schema_fingerprint`] instead.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(Product);
    let mut cart_line_table = schema.create_table_from_entity(CartLine);
    let mut schema_meta_table = schema.create_table_from_entity(SchemaMeta);

    product_table.if_not_exists();
    cart_line_table.if_not_exists();
    schema_meta_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&cart_line_table)).await?;
    db.execute(builder.build(&schema_meta_table)).await?;

    Ok(())
}

/// Computes the fingerprint of the current data tables for `db`'s backend.
///
/// The fingerprint is the SHA-256 of the generated CREATE TABLE statements for the
/// product and cart line tables, so any column change produces a different value.
#[must_use]
pub fn schema_fingerprint(db: &DatabaseConnection) -> String {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut hasher = Sha256::new();
    for statement in [
        builder.build(&schema.create_table_from_entity(Product)),
        builder.build(&schema.create_table_from_entity(CartLine)),
    ] {
        hasher.update(statement.sql.as_bytes());
        hasher.update(b";");
    }
    hex::encode(hasher.finalize())
}

/// Compares the stored fingerprint against the current one.
///
/// A database without a stored fingerprint is treated as freshly created and gets
/// the current value written. A differing fingerprint is fatal.
#[instrument(skip(db))]
pub async fn verify_schema_fingerprint(db: &DatabaseConnection) -> Result<()> {
    let expected = schema_fingerprint(db);

    match SchemaMeta::find_by_id(FINGERPRINT_KEY.to_string())
        .one(db)
        .await?
    {
        Some(stored) if stored.value == expected => {
            debug!("Schema fingerprint matches ({})", expected);
            Ok(())
        }
        Some(stored) => {
            warn!(
                "Schema fingerprint mismatch: expected {}, found {}",
                expected, stored.value
            );
            Err(Error::SchemaMismatch {
                expected,
                found: stored.value,
            })
        }
        None => {
            schema_meta::ActiveModel {
                key: Set(FINGERPRINT_KEY.to_string()),
                value: Set(expected.clone()),
                updated_at: Set(chrono::Utc::now().naive_utc()),
            }
            .insert(db)
            .await?;
            info!("Recorded schema fingerprint {}", expected);
            Ok(())
        }
    }
}

/// Connects to `database_url`, creates missing tables and validates the schema fingerprint.
///
/// This is the single entry point used to open the store at startup.
pub async fn open_database(database_url: &str) -> Result<DatabaseConnection> {
    let db = create_connection(database_url).await?;
    create_tables(&db).await?;
    verify_schema_fingerprint(&db).await?;
    info!("Database ready at {}", database_url);
    Ok(db)
}
